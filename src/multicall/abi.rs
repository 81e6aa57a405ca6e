//! Contract interfaces used by the batched reads
//!
//! Only the 0.3.2 vault interface exposes every legacy view method we read,
//! so all vault groups share it regardless of the vault's own version.

use alloy_primitives::Bytes;
use alloy_sol_types::{sol, SolCall};

// ============================================
// MULTICALL3 INTERFACE
// ============================================

sol! {
    /// Multicall3 - deployed at same address on all EVM chains
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls)
            external payable returns (Result[] memory returnData);
    }
}

// ============================================
// YEARN INTERFACES
// ============================================

sol! {
    /// Yearn V2 vault, API 0.3.2
    #[derive(Debug)]
    interface IVault032 {
        function management() external view returns (address);
        function managementFee() external view returns (uint256);
        function performanceFee() external view returns (uint256);
        function governance() external view returns (address);
        function guardian() external view returns (address);
        function depositLimit() external view returns (uint256);
        function totalAssets() external view returns (uint256);
        function debtRatio() external view returns (uint256);
        function totalDebt() external view returns (uint256);
        function lastReport() external view returns (uint256);
        function rewards() external view returns (address);

        function strategies(address strategy) external view returns (
            uint256 performanceFee,
            uint256 activation,
            uint256 debtRatio,
            uint256 minDebtPerHarvest,
            uint256 maxDebtPerHarvest,
            uint256 lastReport,
            uint256 totalDebt,
            uint256 totalGain,
            uint256 totalLoss
        );
    }

    /// Yearn V2 base strategy
    #[derive(Debug)]
    interface IStrategy {
        function name() external view returns (string);
        function apiVersion() external view returns (string);
        function strategist() external view returns (address);
        function keeper() external view returns (address);
        function rewards() external view returns (address);
        function vault() external view returns (address);
        function emergencyExit() external view returns (bool);
        function isActive() external view returns (bool);
        function estimatedTotalAssets() external view returns (uint256);
    }

    /// Strategies helper: ordered withdrawal queue per vault
    #[derive(Debug)]
    interface IStrategiesHelper {
        function assetStrategiesAddresses(address assetAddress) external view returns (address[] memory);
    }
}

/// Which interface a call group was encoded against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractAbi {
    Vault032,
    Strategy,
    StrategiesHelper,
}

impl std::fmt::Display for ContractAbi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractAbi::Vault032 => write!(f, "Vault(0.3.2)"),
            ContractAbi::Strategy => write!(f, "Strategy"),
            ContractAbi::StrategiesHelper => write!(f, "StrategiesHelper"),
        }
    }
}

// ============================================
// VIEW METHOD ENCODING
// ============================================

/// Vault view methods read for every catalog vault
pub const VAULT_VIEW_METHODS: [&str; 11] = [
    "management",
    "managementFee",
    "performanceFee",
    "governance",
    "guardian",
    "depositLimit",
    "totalAssets",
    "debtRatio",
    "totalDebt",
    "lastReport",
    "rewards",
];

/// Strategy view methods read for every catalog strategy
pub const STRATEGY_VIEW_METHODS: [&str; 9] = [
    "name",
    "apiVersion",
    "strategist",
    "keeper",
    "rewards",
    "vault",
    "emergencyExit",
    "isActive",
    "estimatedTotalAssets",
];

/// Calldata for a parameterless vault view method
pub fn encode_vault_view(method: &str) -> Option<Bytes> {
    let data = match method {
        "management" => IVault032::managementCall {}.abi_encode(),
        "managementFee" => IVault032::managementFeeCall {}.abi_encode(),
        "performanceFee" => IVault032::performanceFeeCall {}.abi_encode(),
        "governance" => IVault032::governanceCall {}.abi_encode(),
        "guardian" => IVault032::guardianCall {}.abi_encode(),
        "depositLimit" => IVault032::depositLimitCall {}.abi_encode(),
        "totalAssets" => IVault032::totalAssetsCall {}.abi_encode(),
        "debtRatio" => IVault032::debtRatioCall {}.abi_encode(),
        "totalDebt" => IVault032::totalDebtCall {}.abi_encode(),
        "lastReport" => IVault032::lastReportCall {}.abi_encode(),
        "rewards" => IVault032::rewardsCall {}.abi_encode(),
        _ => return None,
    };
    Some(data.into())
}

/// Calldata for a parameterless strategy view method
pub fn encode_strategy_view(method: &str) -> Option<Bytes> {
    let data = match method {
        "name" => IStrategy::nameCall {}.abi_encode(),
        "apiVersion" => IStrategy::apiVersionCall {}.abi_encode(),
        "strategist" => IStrategy::strategistCall {}.abi_encode(),
        "keeper" => IStrategy::keeperCall {}.abi_encode(),
        "rewards" => IStrategy::rewardsCall {}.abi_encode(),
        "vault" => IStrategy::vaultCall {}.abi_encode(),
        "emergencyExit" => IStrategy::emergencyExitCall {}.abi_encode(),
        "isActive" => IStrategy::isActiveCall {}.abi_encode(),
        "estimatedTotalAssets" => IStrategy::estimatedTotalAssetsCall {}.abi_encode(),
        _ => return None,
    };
    Some(data.into())
}
