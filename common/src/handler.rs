//! [`Handler`] abstractions.

/// Executable handler.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    ///
    /// # Errors
    ///
    /// If the execution fails.
    fn execute(&self, args: Args) -> Result<Self::Ok, Self::Err>;
}

/// Executable handler mutating its receiver.
pub trait HandlerMut<Args = ()> {
    /// Type of successful [`HandlerMut`] result.
    type Ok;

    /// Type of this [`HandlerMut`] error.
    type Err;

    /// Executes this [`HandlerMut`] with the provided arguments.
    ///
    /// # Errors
    ///
    /// If the execution fails.
    fn execute(&mut self, args: Args) -> Result<Self::Ok, Self::Err>;
}
