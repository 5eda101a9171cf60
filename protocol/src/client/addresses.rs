//! Address generation and input discovery.

use tracing::{debug, warn};

use super::Client;
use crate::config::{AddressOptions, InputOptions, BALANCE_THRESHOLD, MAX_ADDRESS_RANGE};
use crate::crypto::{add_checksum, generate_address, seed_trits, SecurityLevel};
use crate::error::{Error, Result};
use crate::network::{FindTransactionsQuery, NodeApi, NodeError};
use crate::transaction::{Input, Inputs};

impl<N: NodeApi> Client<N> {
    /// Generate addresses from `seed`.
    ///
    /// With `options.total` set, returns exactly that many consecutive
    /// addresses starting at `options.index` without touching the node.
    /// Otherwise scans upward from `options.index` until the node reports no
    /// transactions for an address, and returns that first unused address
    /// (or, with `return_all`, every address visited including the unused
    /// one).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] for a malformed seed.
    /// - [`Error::InvalidTransferSpec`] for `total == Some(0)` or a total
    ///   above the address range limit.
    pub async fn get_new_address(
        &self,
        seed: &str,
        options: &AddressOptions,
    ) -> Result<Vec<String>> {
        seed_trits(seed)?;
        let decorate = |address: String| -> Result<String> {
            if options.checksum {
                Ok(add_checksum(&address)?)
            } else {
                Ok(address)
            }
        };

        if let Some(total) = options.total {
            if total == 0 || total > MAX_ADDRESS_RANGE {
                return Err(Error::InvalidTransferSpec(format!(
                    "address total must be between 1 and {MAX_ADDRESS_RANGE}, got {total}"
                )));
            }
            return (options.index..options.index + total)
                .map(|index| decorate(generate_address(seed, index, options.security)?))
                .collect();
        }

        let (visited, _) = self.scan_addresses(seed, options.index, options.security).await?;
        let mut visited = visited
            .into_iter()
            .map(decorate)
            .collect::<Result<Vec<_>>>()?;
        if options.return_all {
            Ok(visited)
        } else {
            Ok(visited.pop().into_iter().collect())
        }
    }

    /// Walk addresses from `start` until one has no transactions.
    ///
    /// Returns every bare address visited (the last one unused) and the index
    /// of that unused address.
    pub(crate) async fn scan_addresses(
        &self,
        seed: &str,
        start: usize,
        security: SecurityLevel,
    ) -> Result<(Vec<String>, usize)> {
        let mut visited = Vec::new();
        let mut index = start;
        loop {
            let address = generate_address(seed, index, security)?;
            let hashes = self
                .node
                .find_transactions(&FindTransactionsQuery::addresses([address.clone()]))
                .await?;
            visited.push(address);
            if hashes.is_empty() {
                debug!(start, unused = index, "address scan finished");
                return Ok((visited, index));
            }
            index += 1;
        }
    }

    /// Collect addresses of `seed` with a positive confirmed balance.
    ///
    /// With `options.end` the inclusive range `start..=end` is checked;
    /// otherwise addresses are scanned like [`get_new_address`] does. Balances
    /// come from the node at a 100% confirmation threshold. With a
    /// `threshold`, collection stops as soon as the running total reaches it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransferSpec`] for `start > end` or a range of more
    ///   than 500 addresses.
    /// - [`Error::InsufficientBalance`] when a threshold is set and not met.
    ///
    /// [`get_new_address`]: Self::get_new_address
    pub async fn get_inputs(&self, seed: &str, options: &InputOptions) -> Result<Inputs> {
        seed_trits(seed)?;
        let addresses = match options.end {
            Some(end) => {
                if options.start > end || end - options.start >= MAX_ADDRESS_RANGE {
                    return Err(Error::InvalidTransferSpec(format!(
                        "invalid input range {}..={end} (at most {MAX_ADDRESS_RANGE} addresses)",
                        options.start
                    )));
                }
                (options.start..=end)
                    .map(|index| generate_address(seed, index, options.security))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                self.scan_addresses(seed, options.start, options.security)
                    .await?
                    .0
            }
        };

        let balances = self.node.get_balances(&addresses, BALANCE_THRESHOLD).await?;
        if balances.len() != addresses.len() {
            return Err(NodeError::InvalidResponse(format!(
                "asked for {} balances, got {}",
                addresses.len(),
                balances.len()
            ))
            .into());
        }

        let mut found = Inputs::default();
        for (offset, (address, balance)) in addresses.into_iter().zip(balances).enumerate() {
            if balance <= 0 {
                continue;
            }
            found.total_balance += balance;
            found.inputs.push(Input::new(
                address,
                balance,
                options.start + offset,
                options.security,
            ));
            if options.threshold.is_some_and(|t| found.total_balance >= t) {
                break;
            }
        }

        if let Some(threshold) = options.threshold {
            if found.total_balance < threshold {
                warn!(required = threshold, available = found.total_balance, "not enough balance");
                return Err(Error::InsufficientBalance {
                    required: threshold,
                    available: found.total_balance,
                });
            }
        }
        debug!(inputs = found.inputs.len(), total = found.total_balance, "inputs collected");
        Ok(found)
    }
}
