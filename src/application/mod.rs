pub mod notifier;
pub mod store;
pub mod sync_actions;

#[cfg(test)]
mod sync_actions_tests;
