mod in_memory_job_repository_test;
mod timeout_decorators_test;
