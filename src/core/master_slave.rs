//! The master/slave state model used by replicated storage resources.

crate::state_enum! {
    /// Replica states of the master/slave model.
    ///
    /// OFFLINE is the initial state, ERROR is where failed transitions land and
    /// DROPPED is terminal.
    pub enum MasterSlaveState {
        Offline = "OFFLINE",
        Slave = "SLAVE",
        Master = "MASTER",
        Error = "ERROR",
        Dropped = "DROPPED",
    }
    final: [Dropped]
    error: [Error]
}

impl MasterSlaveState {
    /// All states in declaration order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::Offline,
            Self::Slave,
            Self::Master,
            Self::Error,
            Self::Dropped,
        ]
    }
}
