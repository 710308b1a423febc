mod resilient_client_tests;
mod user_directory_tests;
