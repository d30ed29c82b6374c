//! Decoded `FundTransfer` events.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use crowdsale_contracts::abi::FundTransfer;
use crowdsale_rpc::RpcLog;

use crate::ExportError;

/// A `FundTransfer` log with its position in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundTransferRecord {
    /// Contributor or refund recipient.
    pub backer: Address,
    /// Wei moved.
    pub amount: U256,
    /// `false` for refunds.
    pub is_contribution: bool,
    /// Sale total after this event.
    pub amount_raised: U256,
    /// Block the event was emitted in.
    pub block_number: u64,
    /// Position of the log within its block.
    pub log_index: u64,
}

impl FundTransferRecord {
    /// Decodes a raw log.
    pub fn from_log(log: &RpcLog) -> Result<Self, ExportError> {
        let block_number = log.block_number.to::<u64>();
        let event = FundTransfer::decode_raw_log(log.topics.iter().copied(), &log.data)
            .map_err(|e| ExportError::Decode {
                what: "FundTransfer",
                block: block_number,
                reason: e.to_string(),
            })?;

        Ok(Self {
            backer: event.backer,
            amount: event.amount,
            is_contribution: event.isContribution,
            amount_raised: event.amountRaised,
            block_number,
            log_index: log.log_index.to::<u64>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{B256, U64, address};

    use super::*;

    const BACKER: Address = address!("00000000000000000000000000000000000000b1");

    fn rpc_log(event: &FundTransfer, block: u64) -> RpcLog {
        let data = event.encode_log_data();
        RpcLog {
            address: address!("362bb67f7fdbdd0dbba4bce16da6a284cf484ed6"),
            topics: data.topics().to_vec(),
            data: data.data,
            block_number: U64::from(block),
            transaction_hash: B256::ZERO,
            transaction_index: U64::ZERO,
            block_hash: B256::ZERO,
            log_index: U64::from(2),
            removed: false,
        }
    }

    #[test]
    fn decodes_contribution() {
        let event = FundTransfer {
            backer: BACKER,
            amount: U256::from(20u64),
            isContribution: true,
            amountRaised: U256::from(60u64),
        };
        let record = FundTransferRecord::from_log(&rpc_log(&event, 9)).unwrap();

        assert_eq!(record.backer, BACKER);
        assert_eq!(record.amount, U256::from(20u64));
        assert!(record.is_contribution);
        assert_eq!(record.amount_raised, U256::from(60u64));
        assert_eq!(record.block_number, 9);
        assert_eq!(record.log_index, 2);
    }

    #[test]
    fn rejects_foreign_event() {
        let event = FundTransfer {
            backer: BACKER,
            amount: U256::from(1u64),
            isContribution: false,
            amountRaised: U256::ZERO,
        };
        let mut log = rpc_log(&event, 4);
        log.topics[0] = B256::repeat_byte(0xee);

        let err = FundTransferRecord::from_log(&log).unwrap_err();
        assert!(matches!(err, ExportError::Decode { block: 4, .. }));
    }

    #[test]
    fn rejects_truncated_data() {
        let event = FundTransfer {
            backer: BACKER,
            amount: U256::from(1u64),
            isContribution: true,
            amountRaised: U256::from(1u64),
        };
        let mut log = rpc_log(&event, 5);
        log.data = log.data.slice(..40);

        assert!(FundTransferRecord::from_log(&log).is_err());
    }
}
