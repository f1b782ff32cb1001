use std::future::Future;

/// Capabilities the engine needs from the player driving it.
///
/// `can_accept_challenge` and `should_terminate` are polled by the engine;
/// the `on_*` callbacks have no-op defaults except battle messages, which
/// every controller has to consume.
///
/// # Example
///
/// ```ignore
/// struct Waiter {
///     battles_left: usize,
/// }
///
/// impl SessionController for Waiter {
///     fn can_accept_challenge(&self) -> bool {
///         self.battles_left > 0
///     }
///
///     fn should_terminate(&self) -> bool {
///         self.battles_left == 0
///     }
///
///     async fn on_battle_message(&mut self, room: &str, message: &str) {
///         if message.contains("|win|") {
///             self.battles_left -= 1;
///         }
///     }
/// }
/// ```
pub trait SessionController: Send {
    /// Whether an incoming challenge in the configured format may be accepted now
    fn can_accept_challenge(&self) -> bool;

    /// Checked once per receive-loop iteration, before the next read
    fn should_terminate(&self) -> bool;

    /// Called with every frame of a battle room, verbatim
    fn on_battle_message(
        &mut self,
        room: &str,
        message: &str,
    ) -> impl Future<Output = ()> + Send;

    /// Called once, when the server confirms our identity
    fn on_logged_in(&mut self, username: &str) -> impl Future<Output = ()> + Send {
        let _ = username;
        async {}
    }

    /// Called before the first message of a new battle room
    fn on_session_start(&mut self, room: &str) -> impl Future<Output = ()> + Send {
        let _ = room;
        async {}
    }

    /// Called when the server refuses the requested name
    fn on_name_taken(
        &mut self,
        username: &str,
        message: &str,
    ) -> impl Future<Output = ()> + Send {
        let _ = (username, message);
        async {}
    }
}
