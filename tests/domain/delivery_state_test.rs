use whispai::domain::DeliveryState;

#[test]
fn given_received_delivery_when_following_happy_path_then_reaches_acked() {
    let state = DeliveryState::Received
        .advance(DeliveryState::Decoding)
        .and_then(|s| s.advance(DeliveryState::Processing))
        .and_then(|s| s.advance(DeliveryState::Acked))
        .unwrap();

    assert_eq!(state, DeliveryState::Acked);
    assert!(state.is_terminal());
}

#[test]
fn given_decoding_delivery_when_nacking_then_transition_is_allowed() {
    assert!(DeliveryState::Decoding.can_advance_to(DeliveryState::Nacked));
}

#[test]
fn given_decoding_delivery_when_acking_then_transition_is_rejected() {
    assert!(DeliveryState::Decoding.advance(DeliveryState::Acked).is_err());
}

#[test]
fn given_settled_delivery_when_advancing_then_transition_is_rejected() {
    assert!(DeliveryState::Acked.advance(DeliveryState::Nacked).is_err());
    assert!(DeliveryState::Nacked.advance(DeliveryState::Processing).is_err());
    assert!(!DeliveryState::Processing.is_terminal());
}
