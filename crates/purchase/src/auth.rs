//! Authentication state access.

/// Login state and login-flow trigger.
///
/// `is_logged_in` is synchronous by contract: the purchase flow samples it
/// at decision points and never waits for a login to finish. `login` only
/// kicks off the application's login UI as a side effect; the flow that
/// triggered it has already failed by the time the user sees it.
pub trait AuthenticationGate: Send + Sync {
    fn is_logged_in(&self) -> bool;

    fn login(&self);
}
