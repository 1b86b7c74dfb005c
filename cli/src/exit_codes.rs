//! Exit codes for the ethcali CLI.
//!
//! Following standard Unix conventions and providing specific codes
//! for different error categories to aid scripting and automation.

/// Exit codes for the ethcali CLI.
///
/// These codes follow Unix conventions where possible:
/// - 0: Success
/// - 1: General error
/// - 2: Misuse of shell command (e.g., invalid arguments)
/// - 130: Script terminated by Ctrl+C (128 + SIGINT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,

    /// General/unknown error
    GeneralError = 1,

    /// Invalid usage (bad arguments, invalid values)
    InvalidUsage = 2,

    /// Configuration error (missing config, invalid config)
    ConfigError = 3,

    /// RPC, wallet transport, or metadata gateway error
    NetworkError = 4,

    /// Transaction failed or was not confirmed
    TransactionFailed = 5,

    /// Allowance does not cover the purchase
    InsufficientFunds = 6,

    /// User rejected the request in the wallet
    UserCancelled = 7,

    /// Wallet not connected
    WalletError = 8,

    /// Chain or contract not found
    NotFound = 9,

    /// Operation timed out
    Timeout = 10,

    /// Interrupted by signal (Ctrl+C)
    /// Standard Unix convention: 128 + signal number (SIGINT = 2)
    Interrupted = 130,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Exit the process with this code
    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl From<&anyhow::Error> for ExitCode {
    fn from(err: &anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<ethcali_lib::EthcaliError>() {
            return ExitCode::from(err);
        }

        // Include the context chain so wrapped messages still match
        let msg = format!("{err:#}").to_lowercase();

        if msg.contains("timed out") || msg.contains("timeout") {
            ExitCode::Timeout
        } else if msg.contains("config") {
            ExitCode::ConfigError
        } else if msg.contains("unknown chain") || msg.contains("not found") {
            ExitCode::NotFound
        } else if msg.contains("invalid") {
            ExitCode::InvalidUsage
        } else {
            ExitCode::GeneralError
        }
    }
}

impl From<&ethcali_lib::EthcaliError> for ExitCode {
    fn from(err: &ethcali_lib::EthcaliError) -> Self {
        use ethcali_lib::wallet::USER_REJECTED;
        use ethcali_lib::EthcaliError;

        match err {
            EthcaliError::ConfigMissing(_)
            | EthcaliError::InvalidConfig(_)
            | EthcaliError::NoConfigDir
            | EthcaliError::TomlParse(_)
            | EthcaliError::TomlSerialize(_) => ExitCode::ConfigError,

            EthcaliError::MissingContract { .. }
            | EthcaliError::MissingToken { .. }
            | EthcaliError::UnsupportedChain(_) => ExitCode::NotFound,

            EthcaliError::InsufficientAllowance { .. } => ExitCode::InsufficientFunds,

            EthcaliError::ApprovalReverted(_) | EthcaliError::RedemptionState(_) => {
                ExitCode::TransactionFailed
            }

            EthcaliError::ConfirmationTimeout(_) => ExitCode::Timeout,

            EthcaliError::Provider(e) if e.code == USER_REJECTED => ExitCode::UserCancelled,

            EthcaliError::WalletNotConnected => ExitCode::WalletError,

            EthcaliError::Provider(_)
            | EthcaliError::Read(_)
            | EthcaliError::Metadata(_)
            | EthcaliError::Http(_)
            | EthcaliError::Curl(_) => ExitCode::NetworkError,

            EthcaliError::InvalidAmount(_)
            | EthcaliError::InvalidProduct(_)
            | EthcaliError::InvalidTokenId(_)
            | EthcaliError::InvalidAddress(_) => ExitCode::InvalidUsage,

            _ => ExitCode::GeneralError,
        }
    }
}
