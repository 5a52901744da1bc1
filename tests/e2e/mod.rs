// End-to-end tests for the Exam Audio API
//
// The provider and storage are wiremock servers started per test. Tests that
// need the Postgres credential store use DbTestContext, which leases an
// isolated database (test_db_<uuid>) from one shared testcontainers
// PostgreSQL instance; the rest run against an in-memory key store.

mod helpers;
mod test_api_keys;
