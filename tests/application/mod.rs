mod model_cache_test;
mod submission_service_test;
