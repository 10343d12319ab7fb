/// CRUD operations against the `subscriptions` table
pub mod crud_tests;
