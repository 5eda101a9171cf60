//! Transfer preparation, sending, replaying, and broadcasting.
//!
//! [`prepare_transfers_offline`] is the pure core: given a seed, the
//! transfers, and already-confirmed inputs, it builds, finalizes, and signs a
//! bundle without any node. [`Client::prepare_transfers`] wraps it with the
//! node work: confirming or discovering inputs, refusing spent addresses,
//! and deriving a remainder address.

use chrono::Utc;
use tracing::{info, warn};

use super::Client;
use crate::config::{
    InputOptions, SendOptions, TransferOptions, BALANCE_THRESHOLD, TRANSACTION_TRYTES,
};
use crate::crypto::{remove_checksum, seed_trits};
use crate::error::{Error, Result};
use crate::network::{FindTransactionsQuery, NodeApi, NodeError};
use crate::ternary::validate_trytes;
use crate::transaction::{sign_bundle, split_message, BundleBuilder, Input, Transaction, Transfer};

/// Pick inputs in order until their balances cover `total`.
///
/// Non-positive balances are skipped. Returns the chosen inputs and the
/// remainder (collected minus `total`).
///
/// # Errors
///
/// [`Error::InsufficientBalance`] if all inputs together fall short.
pub fn select_inputs(inputs: &[Input], total: i64) -> Result<(Vec<Input>, i64)> {
    let mut selected = Vec::new();
    let mut collected: i64 = 0;
    for input in inputs {
        if collected >= total {
            break;
        }
        if input.balance <= 0 {
            continue;
        }
        collected = collected
            .checked_add(input.balance)
            .ok_or_else(|| Error::InvalidTransferSpec("input balances overflow".to_string()))?;
        selected.push(input.clone());
    }
    if collected < total {
        return Err(Error::InsufficientBalance {
            required: total,
            available: collected,
        });
    }
    Ok((selected, collected - total))
}

/// Shape-check transfers and return their total value.
fn transfers_total(transfers: &[Transfer]) -> Result<i64> {
    if transfers.is_empty() {
        return Err(Error::InvalidTransferSpec("no transfers given".to_string()));
    }
    let mut total: i64 = 0;
    for transfer in transfers {
        transfer.validate()?;
        total = total
            .checked_add(transfer.value)
            .ok_or_else(|| Error::InvalidTransferSpec("transfer values overflow".to_string()))?;
    }
    Ok(total)
}

/// Build, finalize, and sign a transfer bundle without a node.
///
/// 1. One output entry per transfer, plus a continuation entry for every
///    further 2187 trytes of message.
/// 2. If the total is positive, inputs are taken in order until they cover
///    it. Each contributes `security` entries, the first carrying minus its
///    full balance.
/// 3. Any excess goes to `remainder_address` as one final entry.
/// 4. The bundle is finalized and every input signs it.
///
/// A zero-total bundle needs no inputs and is not signed. Inputs and the
/// remainder reuse the last transfer's tag. Returns trytes head first, ready
/// for the node's attach step.
///
/// # Errors
///
/// - [`Error::InvalidTransferSpec`] for malformed transfers, a remainder
///   with no remainder address, or a remainder address that is also an
///   input.
/// - [`Error::InsufficientBalance`] if the inputs cannot cover the total.
pub fn prepare_transfers_offline(
    seed: &str,
    transfers: &[Transfer],
    inputs: &[Input],
    remainder_address: Option<&str>,
    timestamp: i64,
) -> Result<Vec<String>> {
    seed_trits(seed)?;
    let total = transfers_total(transfers)?;

    let mut builder = BundleBuilder::new();
    let mut fragments = Vec::new();
    for transfer in transfers {
        let parts = split_message(&transfer.message);
        builder.add_entry(
            parts.len(),
            &transfer.address,
            transfer.value,
            &transfer.tag,
            timestamp,
        )?;
        fragments.extend(parts);
    }

    if total == 0 {
        return builder.finalize(&fragments)?.to_trytes();
    }

    let tag = transfers.last().map(|t| t.tag.as_str()).unwrap_or_default();
    let (selected, remainder) = select_inputs(inputs, total)?;
    for input in &selected {
        builder.add_entry(
            input.security.fragments(),
            &input.address,
            -input.balance,
            tag,
            timestamp,
        )?;
    }

    if remainder > 0 {
        let address = remainder_address.ok_or_else(|| {
            Error::InvalidTransferSpec(format!("remainder of {remainder} needs a remainder address"))
        })?;
        let bare = remove_checksum(address)?;
        for input in &selected {
            if remove_checksum(&input.address)? == bare {
                return Err(Error::InvalidTransferSpec(format!(
                    "remainder address {bare} is also an input"
                )));
            }
        }
        builder.add_entry(1, &bare, remainder, tag, timestamp)?;
    }

    let bundle = sign_bundle(builder.finalize(&fragments)?, seed, &selected)?;
    info!(
        bundle = bundle.hash(),
        entries = bundle.len(),
        total,
        inputs = selected.len(),
        remainder,
        "transfer prepared"
    );
    bundle.to_trytes()
}

impl<N: NodeApi> Client<N> {
    /// Prepare a signed transfer bundle, using the node for inputs.
    ///
    /// Caller-supplied inputs are re-checked against the node: zero-balance
    /// ones are dropped and balances replaced by the node's. Without inputs,
    /// [`get_inputs`](Self::get_inputs) gathers just enough. Inputs that
    /// have already been spent from are refused. A remainder address is
    /// derived (the first unused address after the highest input index) when
    /// none is given. The remainder address and any given inputs are
    /// shape-checked before the node is contacted.
    ///
    /// # Errors
    ///
    /// Everything [`prepare_transfers_offline`] returns, plus
    /// [`Error::SpentAddress`] and node errors.
    pub async fn prepare_transfers(
        &self,
        seed: &str,
        transfers: &[Transfer],
        options: &TransferOptions,
    ) -> Result<Vec<String>> {
        seed_trits(seed)?;
        let total = transfers_total(transfers)?;
        let given_remainder = options
            .remainder_address
            .as_deref()
            .map(remove_checksum)
            .transpose()?;
        if let (Some(remainder), Some(given)) = (&given_remainder, &options.inputs) {
            for input in given {
                if remove_checksum(&input.address)? == *remainder {
                    return Err(Error::InvalidTransferSpec(format!(
                        "remainder address {remainder} is also an input"
                    )));
                }
            }
        }
        let timestamp = Utc::now().timestamp();

        if total == 0 {
            return prepare_transfers_offline(seed, transfers, &[], None, timestamp);
        }

        let inputs = match &options.inputs {
            Some(given) => self.confirm_inputs(given, total).await?,
            None => {
                let query = InputOptions {
                    threshold: Some(total),
                    security: options.security,
                    ..InputOptions::default()
                };
                self.get_inputs(seed, &query).await?.inputs
            }
        };
        let (selected, remainder) = select_inputs(&inputs, total)?;
        self.ensure_unspent(&selected).await?;

        let remainder_address = match (given_remainder, remainder > 0) {
            (Some(address), _) => Some(address),
            (None, true) => {
                let next = selected
                    .iter()
                    .map(|i| i.key_index)
                    .max()
                    .map_or(0, |k| k + 1);
                let (mut visited, _) = self.scan_addresses(seed, next, options.security).await?;
                visited.pop()
            }
            (None, false) => None,
        };

        prepare_transfers_offline(
            seed,
            transfers,
            &selected,
            remainder_address.as_deref(),
            timestamp,
        )
    }

    /// Replace caller-supplied balances with the node's view.
    async fn confirm_inputs(&self, given: &[Input], total: i64) -> Result<Vec<Input>> {
        let addresses = given
            .iter()
            .map(|i| remove_checksum(&i.address))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let balances = self.node.get_balances(&addresses, BALANCE_THRESHOLD).await?;
        if balances.len() != given.len() {
            return Err(NodeError::InvalidResponse(format!(
                "asked for {} balances, got {}",
                given.len(),
                balances.len()
            ))
            .into());
        }

        let confirmed: Vec<Input> = given
            .iter()
            .zip(addresses)
            .zip(balances)
            .filter(|(_, balance)| *balance > 0)
            .map(|((input, address), balance)| Input {
                address,
                balance,
                ..input.clone()
            })
            .collect();
        let available: i64 = confirmed.iter().map(|i| i.balance).sum();
        if available < total {
            warn!(required = total, available, "supplied inputs do not cover transfer");
            return Err(Error::InsufficientBalance {
                required: total,
                available,
            });
        }
        Ok(confirmed)
    }

    /// Refuse inputs whose address already has an outgoing transaction.
    ///
    /// One-time keys leak with every signature; a second spend from the same
    /// address hands an attacker enough to forge.
    pub async fn ensure_unspent(&self, inputs: &[Input]) -> Result<()> {
        if inputs.is_empty() {
            return Ok(());
        }
        let addresses = inputs
            .iter()
            .map(|i| remove_checksum(&i.address))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let hashes = self
            .node
            .find_transactions(&FindTransactionsQuery::addresses(addresses.clone()))
            .await?;
        for tx in self.get_transactions_objects(&hashes).await? {
            if tx.value < 0 && addresses.contains(&tx.address) {
                warn!(address = %tx.address, "refusing to spend from a spent address");
                return Err(Error::SpentAddress { address: tx.address });
            }
        }
        Ok(())
    }

    /// Attach trytes (head first) to tips at `depth` and submit them.
    ///
    /// Returns the attached transactions in the order given.
    pub async fn send_trytes(
        &self,
        trytes: &[String],
        options: &SendOptions,
    ) -> Result<Vec<Transaction>> {
        for raw in trytes {
            validate_trytes("transaction", raw, Some(TRANSACTION_TRYTES))?;
        }
        let tips = self.node.get_transactions_to_approve(options.depth).await?;
        let attached = self
            .node
            .attach_to_tangle(
                &tips.trunk_transaction,
                &tips.branch_transaction,
                options.min_weight_magnitude,
                trytes,
            )
            .await?;
        self.node.submit_transactions(&attached).await?;

        attached
            .iter()
            .map(|raw| Transaction::from_trytes(raw).map_err(Error::from))
            .collect()
    }

    /// [`prepare_transfers`](Self::prepare_transfers) followed by
    /// [`send_trytes`](Self::send_trytes).
    pub async fn send_transfer(
        &self,
        seed: &str,
        transfers: &[Transfer],
        transfer_options: &TransferOptions,
        send_options: &SendOptions,
    ) -> Result<Vec<Transaction>> {
        let trytes = self.prepare_transfers(seed, transfers, transfer_options).await?;
        let sent = self.send_trytes(&trytes, send_options).await?;
        if let Some(tail) = sent.last() {
            info!(bundle = %tail.bundle, entries = sent.len(), "transfer sent");
        }
        Ok(sent)
    }

    /// Fetch and validate the bundle at `tail`, then attach it again on new
    /// tips.
    pub async fn replay_transfer(
        &self,
        tail: &str,
        options: &SendOptions,
    ) -> Result<Vec<Transaction>> {
        let bundle = self.get_bundle(tail).await?;
        self.send_trytes(&bundle.to_trytes()?, options).await
    }

    /// Fetch and validate the bundle at `tail`, then submit its trytes as
    /// they are.
    pub async fn broadcast_bundle(&self, tail: &str) -> Result<()> {
        let bundle = self.get_bundle(tail).await?;
        self.node.submit_transactions(&bundle.to_trytes()?).await?;
        Ok(())
    }
}
