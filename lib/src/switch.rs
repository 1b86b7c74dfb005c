//! Wallet network switching.
//!
//! Drives `Idle -> Switching -> (Succeeded | Failed)`. Wallets that do not know
//! the target network get it registered through `wallet_addEthereumChain`
//! followed by a single retry of the switch.

use crate::error::{EthcaliError, Result};
use crate::network::{ChainDescriptor, ChainRegistry};
use crate::resolver::ChainResolver;
use crate::wallet::{ProviderError, WalletHandle, USER_REJECTED};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// How a provider error is handled during a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The user declined in their wallet; recovered silently
    UserRejected,
    /// The wallet does not know the network; register it and retry
    UnknownChain,
    Other,
}

/// Codes meaning the user declined
const USER_REJECTED_CODES: &[i64] = &[USER_REJECTED];

/// Codes wallets use for an unregistered network
const UNKNOWN_CHAIN_CODES: &[i64] = &[crate::wallet::UNRECOGNIZED_CHAIN, crate::wallet::INTERNAL_ERROR];

/// Lowercase message fragments wallets use for an unregistered network.
/// Wallet-specific and not exhaustive.
const UNKNOWN_CHAIN_MESSAGES: &[&str] = &[
    "unsupported chainid",
    "unrecognized chain",
    "chain not found",
    "unknown chain",
    "not supported",
];

pub fn classify(error: &ProviderError) -> ErrorClass {
    if USER_REJECTED_CODES.contains(&error.code) {
        return ErrorClass::UserRejected;
    }
    if UNKNOWN_CHAIN_CODES.contains(&error.code) {
        return ErrorClass::UnknownChain;
    }
    let message = error.message.to_lowercase();
    if UNKNOWN_CHAIN_MESSAGES.iter().any(|m| message.contains(m)) {
        return ErrorClass::UnknownChain;
    }
    ErrorClass::Other
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SwitchState {
    Idle,
    Switching { target: u64 },
    Succeeded { chain_id: u64 },
    /// `error` is set only for failures the user should see
    Failed { target: u64, error: Option<String> },
}

/// Outcome of one switch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// The wallet was already shown on the target chain; nothing was sent
    AlreadyOnChain,
    /// Another switch is in flight; nothing was sent
    InProgress,
    Switched,
    /// The network was registered and the retry succeeded
    AddedAndSwitched,
    /// The network was registered but the retry failed; the user may need to
    /// switch manually
    AddedPendingManualSwitch,
    Rejected,
    Failed { message: String },
}

impl SwitchOutcome {
    pub fn is_switched(&self) -> bool {
        matches!(
            self,
            SwitchOutcome::AlreadyOnChain | SwitchOutcome::Switched | SwitchOutcome::AddedAndSwitched
        )
    }

    /// Message to show the user, if any
    pub fn user_error(&self) -> Option<&str> {
        match self {
            SwitchOutcome::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Displayed chain, split into what we assume and what the wallet confirmed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChainView {
    /// Set as soon as a switch succeeds, before the wallet is re-queried
    pub optimistic: Option<u64>,
    /// Last chain read back from the wallet
    pub confirmed: Option<u64>,
}

impl ChainView {
    pub fn displayed(&self) -> Option<u64> {
        self.optimistic.or(self.confirmed)
    }
}

pub struct ChainSwitchOrchestrator {
    wallet: WalletHandle,
    registry: Arc<ChainRegistry>,
    state: watch::Sender<SwitchState>,
    view: watch::Sender<ChainView>,
}

impl ChainSwitchOrchestrator {
    pub fn new(wallet: WalletHandle, registry: Arc<ChainRegistry>) -> Self {
        Self {
            wallet,
            registry,
            state: watch::Sender::new(SwitchState::Idle),
            view: watch::Sender::new(ChainView::default()),
        }
    }

    pub fn state(&self) -> SwitchState {
        self.state.borrow().clone()
    }

    pub fn chain_view(&self) -> ChainView {
        *self.view.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SwitchState> {
        self.state.subscribe()
    }

    /// Notified whenever the displayed chain changes
    pub fn subscribe_chain(&self) -> watch::Receiver<ChainView> {
        self.view.subscribe()
    }

    /// Read the wallet's chain and record it as confirmed, clearing any
    /// optimistic value.
    pub async fn refresh(&self) -> Result<u64> {
        let tag = self.wallet.chain_tag().await?;
        let chain_id = ChainResolver::new(self.registry.default_chain_id()).resolve(tag.as_ref());
        self.view.send_modify(|view| {
            view.confirmed = Some(chain_id);
            view.optimistic = None;
        });
        Ok(chain_id)
    }

    /// Switch the wallet to `chain_id`.
    ///
    /// Only an unsupported target is an error; every wallet-side result is
    /// reported as a [`SwitchOutcome`].
    pub async fn switch_to(&self, chain_id: u64) -> Result<SwitchOutcome> {
        let target = self
            .registry
            .get(chain_id)
            .ok_or(EthcaliError::UnsupportedChain(chain_id))?;

        if self.chain_view().displayed() == Some(chain_id) {
            return Ok(SwitchOutcome::AlreadyOnChain);
        }

        let started = self.state.send_if_modified(|state| {
            if matches!(state, SwitchState::Switching { .. }) {
                return false;
            }
            *state = SwitchState::Switching { target: chain_id };
            true
        });
        if !started {
            return Ok(SwitchOutcome::InProgress);
        }

        let guard = SwitchGuard {
            state: &self.state,
            target: chain_id,
            armed: true,
        };
        let outcome = self.run_switch(target).await;
        self.finish(guard, &outcome);
        Ok(outcome)
    }

    async fn run_switch(&self, target: &ChainDescriptor) -> SwitchOutcome {
        if target.preregister {
            if let Err(e) = self.wallet.add_chain(target).await {
                tracing::debug!(chain = %target.label, error = %e, "pre-switch add failed, continuing");
            }
        }

        let switch_err = match self.wallet.switch_chain(target).await {
            Ok(()) => return SwitchOutcome::Switched,
            Err(e) => e,
        };

        match classify(&switch_err) {
            ErrorClass::UserRejected => SwitchOutcome::Rejected,
            ErrorClass::Other => self.failure(target, &switch_err),
            ErrorClass::UnknownChain => {
                tracing::info!(chain = %target.label, "wallet does not know chain, adding it");
                if let Err(add_err) = self.wallet.add_chain(target).await {
                    return match classify(&add_err) {
                        ErrorClass::UserRejected => SwitchOutcome::Rejected,
                        _ => self.failure(target, &add_err),
                    };
                }
                match self.wallet.switch_chain(target).await {
                    Ok(()) => SwitchOutcome::AddedAndSwitched,
                    Err(e) => {
                        tracing::info!(chain = %target.label, error = %e, "chain added, switch it manually");
                        SwitchOutcome::AddedPendingManualSwitch
                    }
                }
            }
        }
    }

    fn failure(&self, target: &ChainDescriptor, error: &ProviderError) -> SwitchOutcome {
        let message = EthcaliError::ChainSwitch {
            chain: target.name.clone(),
            message: error.message.clone(),
        }
        .to_string();
        tracing::warn!(chain = %target.label, code = error.code, "{message}");
        SwitchOutcome::Failed { message }
    }

    fn finish(&self, mut guard: SwitchGuard<'_>, outcome: &SwitchOutcome) {
        guard.armed = false;
        let chain_id = guard.target;
        let state = if outcome.is_switched() {
            self.view.send_modify(|view| view.optimistic = Some(chain_id));
            tracing::info!(chain_id, "switched chain");
            SwitchState::Succeeded { chain_id }
        } else {
            SwitchState::Failed {
                target: chain_id,
                error: outcome.user_error().map(str::to_string),
            }
        };
        self.state.send_replace(state);
    }
}

/// Leaves `Switching` if the switch future is dropped before it finishes,
/// so a cancelled switch does not block later ones.
struct SwitchGuard<'a> {
    state: &'a watch::Sender<SwitchState>,
    target: u64,
    armed: bool,
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!(chain_id = self.target, "chain switch dropped before completion");
            self.state.send_replace(SwitchState::Failed {
                target: self.target,
                error: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeWallet;
    use crate::wallet::{INTERNAL_ERROR, UNRECOGNIZED_CHAIN};
    use std::time::Duration;
    use tokio::time::timeout;

    struct TestCase {
        code: i64,
        message: &'static str,
        expected: ErrorClass,
    }

    #[test]
    fn test_classify() {
        let cases = vec![
            TestCase {
                code: 4001,
                message: "User rejected the request.",
                expected: ErrorClass::UserRejected,
            },
            TestCase {
                code: UNRECOGNIZED_CHAIN,
                message: "Unrecognized chain ID",
                expected: ErrorClass::UnknownChain,
            },
            TestCase {
                code: INTERNAL_ERROR,
                message: "Internal error",
                expected: ErrorClass::UnknownChain,
            },
            TestCase {
                code: -32000,
                message: "Unsupported chainId 0x82",
                expected: ErrorClass::UnknownChain,
            },
            TestCase {
                code: -32000,
                message: "This network is NOT SUPPORTED",
                expected: ErrorClass::UnknownChain,
            },
            TestCase {
                code: -32000,
                message: "Chain not found",
                expected: ErrorClass::UnknownChain,
            },
            TestCase {
                code: -32002,
                message: "Request already pending",
                expected: ErrorClass::Other,
            },
        ];

        for case in cases {
            let err = ProviderError::new(case.code, case.message);
            assert_eq!(classify(&err), case.expected, "{}", case.message);
        }
    }

    fn orchestrator(wallet: Arc<FakeWallet>) -> ChainSwitchOrchestrator {
        ChainSwitchOrchestrator::new(
            WalletHandle::new(wallet),
            Arc::new(ChainRegistry::builtin()),
        )
    }

    #[tokio::test]
    async fn test_switch_succeeds_directly() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        let orchestrator = orchestrator(wallet.clone());
        let mut chain_rx = orchestrator.subscribe_chain();
        let mut state_rx = orchestrator.subscribe_state();
        assert_eq!(*state_rx.borrow_and_update(), SwitchState::Idle);

        let outcome = orchestrator.switch_to(1).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Switched);
        assert!(state_rx.has_changed().unwrap());
        assert_eq!(
            *state_rx.borrow_and_update(),
            SwitchState::Succeeded { chain_id: 1 }
        );
        assert_eq!(wallet.methods(), vec!["wallet_switchEthereumChain"]);
        assert_eq!(orchestrator.state(), SwitchState::Succeeded { chain_id: 1 });

        assert!(chain_rx.has_changed().unwrap());
        let view = *chain_rx.borrow_and_update();
        assert_eq!(view.optimistic, Some(1));
        assert_eq!(view.confirmed, None);
    }

    #[tokio::test]
    async fn test_unknown_chain_adds_then_retries_once() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        wallet.script(
            "wallet_switchEthereumChain",
            Err(ProviderError::new(UNRECOGNIZED_CHAIN, "Unrecognized chain ID")),
        );
        let orchestrator = orchestrator(wallet.clone());

        let outcome = orchestrator.switch_to(10).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::AddedAndSwitched);
        assert_eq!(
            wallet.methods(),
            vec![
                "wallet_switchEthereumChain",
                "wallet_addEthereumChain",
                "wallet_switchEthereumChain"
            ]
        );
        assert_eq!(orchestrator.chain_view().displayed(), Some(10));
    }

    #[tokio::test]
    async fn test_failed_retry_is_silent() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        for _ in 0..2 {
            wallet.script(
                "wallet_switchEthereumChain",
                Err(ProviderError::new(UNRECOGNIZED_CHAIN, "Unrecognized chain ID")),
            );
        }
        let orchestrator = orchestrator(wallet.clone());

        let outcome = orchestrator.switch_to(10).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::AddedPendingManualSwitch);
        assert_eq!(outcome.user_error(), None);
        assert_eq!(
            orchestrator.state(),
            SwitchState::Failed {
                target: 10,
                error: None
            }
        );
        assert_eq!(orchestrator.chain_view().displayed(), None);
        assert_eq!(wallet.methods().len(), 3);
    }

    #[tokio::test]
    async fn test_user_rejection_is_silent() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        wallet.script("wallet_switchEthereumChain", Err(ProviderError::user_rejected()));
        let orchestrator = orchestrator(wallet.clone());

        let outcome = orchestrator.switch_to(1).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Rejected);
        assert_eq!(outcome.user_error(), None);
        assert!(!wallet.methods().contains(&"wallet_addEthereumChain".to_string()));
    }

    #[tokio::test]
    async fn test_other_failure_is_surfaced() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        wallet.script(
            "wallet_switchEthereumChain",
            Err(ProviderError::new(-32002, "Request already pending")),
        );
        let orchestrator = orchestrator(wallet.clone());

        let outcome = orchestrator.switch_to(1).await.unwrap();
        assert_eq!(
            outcome.user_error(),
            Some("Failed to switch to Ethereum: Request already pending")
        );
        assert!(matches!(
            orchestrator.state(),
            SwitchState::Failed { error: Some(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_add_failure_is_surfaced() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        wallet.script(
            "wallet_switchEthereumChain",
            Err(ProviderError::new(UNRECOGNIZED_CHAIN, "Unrecognized chain ID")),
        );
        wallet.script(
            "wallet_addEthereumChain",
            Err(ProviderError::new(-32602, "Invalid RPC URL")),
        );
        let orchestrator = orchestrator(wallet.clone());

        let outcome = orchestrator.switch_to(10).await.unwrap();
        assert_eq!(
            outcome.user_error(),
            Some("Failed to switch to Optimism: Invalid RPC URL")
        );
        assert_eq!(wallet.methods().len(), 2);
    }

    #[tokio::test]
    async fn test_preregistered_chain_is_added_first() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        wallet.script(
            "wallet_addEthereumChain",
            Err(ProviderError::new(-32603, "Chain already added")),
        );
        let orchestrator = orchestrator(wallet.clone());

        let outcome = orchestrator.switch_to(130).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Switched);
        assert_eq!(
            wallet.methods(),
            vec!["wallet_addEthereumChain", "wallet_switchEthereumChain"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_switch_releases_state() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        wallet.stall("wallet_switchEthereumChain");
        let orchestrator = orchestrator(wallet.clone());

        let first = timeout(Duration::from_secs(1), orchestrator.switch_to(1)).await;
        assert!(first.is_err());
        assert_eq!(
            orchestrator.state(),
            SwitchState::Failed {
                target: 1,
                error: None
            }
        );
        assert_eq!(orchestrator.chain_view().displayed(), None);

        let outcome = orchestrator.switch_to(10).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::Switched);
        assert_eq!(orchestrator.state(), SwitchState::Succeeded { chain_id: 10 });
        assert_eq!(
            wallet.methods(),
            vec!["wallet_switchEthereumChain", "wallet_switchEthereumChain"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_switch_is_in_progress() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        wallet.stall("wallet_switchEthereumChain");
        let orchestrator = orchestrator(wallet.clone());

        let first = orchestrator.switch_to(1);
        tokio::pin!(first);
        assert!(futures::poll!(first.as_mut()).is_pending());
        assert_eq!(orchestrator.state(), SwitchState::Switching { target: 1 });

        let second = orchestrator.switch_to(10).await.unwrap();
        assert_eq!(second, SwitchOutcome::InProgress);
        assert_eq!(wallet.methods().len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_target_is_error() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        let orchestrator = orchestrator(wallet.clone());
        assert!(matches!(
            orchestrator.switch_to(137).await,
            Err(EthcaliError::UnsupportedChain(137))
        ));
        assert!(wallet.methods().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_confirms_and_skips_redundant_switch() {
        let wallet = Arc::new(FakeWallet::on_chain(8453));
        let orchestrator = orchestrator(wallet.clone());

        assert_eq!(orchestrator.refresh().await.unwrap(), 8453);
        assert_eq!(orchestrator.chain_view().confirmed, Some(8453));

        let outcome = orchestrator.switch_to(8453).await.unwrap();
        assert_eq!(outcome, SwitchOutcome::AlreadyOnChain);
        assert_eq!(wallet.methods(), vec!["eth_chainId"]);
    }
}
