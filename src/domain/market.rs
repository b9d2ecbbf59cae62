//! Market descriptors and the compiled-in contract registry.
//!
//! Every address the client talks to is listed here. Descriptors are
//! `'static` and never mutated; use cases borrow them by reference.
//!
//! Protocol-specific behavior (where a balance comes from, which
//! function deposits, which withdraws) is dispatched on `Protocol`
//! instead of comparing protocol name strings.

use alloy::primitives::{Address, U256, address};

use super::transaction::ActionCall;
use super::units::{ETHER_DECIMALS, STABLECOIN_DECIMALS};

/// Lending protocol family of an earn market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Compound-style share token quoted via `exchangeRateStored()`.
    Rho,
    /// Aave-fork pool using `deposit`; balance tracked by an aToken.
    Lore,
    /// Aave v3 pool using `supply`; balance tracked by an aToken.
    Aave,
}

/// Where a market's supplied balance is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceSource {
    /// `balanceOf` on the share token, scaled by `exchangeRateStored()`.
    ExchangeRate,
    /// `balanceOf` on the aToken, already in underlying units.
    AToken,
}

impl Protocol {
    /// Display name as shown on the market card.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rho => "RHO Markets",
            Self::Lore => "Lore Finance",
            Self::Aave => "AAVE",
        }
    }

    pub const fn balance_source(self) -> BalanceSource {
        match self {
            Self::Rho => BalanceSource::ExchangeRate,
            Self::Lore | Self::Aave => BalanceSource::AToken,
        }
    }

    /// Build the deposit call for `amount` underlying units.
    pub const fn deposit_call(self, market: &EarnMarket, owner: Address, amount: U256) -> ActionCall {
        match self {
            Self::Rho => ActionCall::Mint {
                market: market.address,
                amount,
            },
            Self::Lore => ActionCall::Deposit {
                pool: market.address,
                asset: market.token,
                amount,
                on_behalf_of: owner,
            },
            Self::Aave => ActionCall::Supply {
                pool: market.address,
                asset: market.token,
                amount,
                on_behalf_of: owner,
            },
        }
    }

    /// Build the withdraw call.
    ///
    /// For `Rho` the amount is in share units; otherwise underlying units.
    pub const fn withdraw_call(self, market: &EarnMarket, owner: Address, amount: U256) -> ActionCall {
        match self {
            Self::Rho => ActionCall::Redeem {
                market: market.address,
                shares: amount,
            },
            Self::Lore | Self::Aave => ActionCall::Withdraw {
                pool: market.address,
                asset: market.token,
                amount,
                to: owner,
            },
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Static descriptor of one lending market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarnMarket {
    /// Human-readable pool name.
    pub name: &'static str,
    pub protocol: Protocol,
    /// Pool (Lore/Aave) or share token (Rho) contract.
    pub address: Address,
    /// Underlying asset symbol.
    pub asset: &'static str,
    /// Underlying ERC-20 token.
    pub token: Address,
    /// Interest-bearing token for aToken-style markets.
    pub a_token: Option<Address>,
    /// Underlying asset decimals.
    pub decimals: u8,
    /// Advertised APY, percent.
    pub apy: &'static str,
}

impl EarnMarket {
    /// Contract whose `balanceOf` gives the supplied position.
    pub fn position_token(&self) -> Address {
        match self.protocol.balance_source() {
            BalanceSource::ExchangeRate => self.address,
            BalanceSource::AToken => self.a_token.unwrap_or(self.address),
        }
    }
}

/// ERC-721 collection minted with `safeMint(to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftCollection {
    pub name: &'static str,
    pub address: Address,
    pub image_url: &'static str,
}

/// ERC-20 token selectable on the swap card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapToken {
    pub symbol: &'static str,
    pub address: Address,
    pub decimals: u8,
}

/// Known prediction market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionMarketInfo {
    pub address: Address,
    pub description: &'static str,
}

const USDC: Address = address!("06eFdBFf2a14a7c8E15944D1F4A48F9F95F663A4");
const USDT: Address = address!("f55BEC9cafDbE8730f096Aa55dad6D22d44099Df");
const WETH: Address = address!("5300000000000000000000000000000000000004");
const SCROLL: Address = address!("d29687c813D741E2F938F4aC377128810E217b1b");

/// Lending markets shown on the Earn page.
pub static EARN_MARKETS: &[EarnMarket] = &[
    EarnMarket {
        name: "USDC Lending Pool",
        protocol: Protocol::Rho,
        address: address!("AE1846110F72f2DaaBC75B7cEEe96558289EDfc5"),
        asset: "USDC",
        token: USDC,
        a_token: None,
        decimals: STABLECOIN_DECIMALS,
        apy: "4.5",
    },
    EarnMarket {
        name: "USDT Lending Pool",
        protocol: Protocol::Lore,
        address: address!("4cE1A1eC13DBd9084B1A741b036c061b2d58dABf"),
        asset: "USDT",
        token: USDT,
        a_token: Some(address!("C5776416Ea3e88e04E95bCd3fF99b27902da7892")),
        decimals: STABLECOIN_DECIMALS,
        apy: "5.2",
    },
    EarnMarket {
        name: "USDC Lending Pool",
        protocol: Protocol::Aave,
        address: address!("11fCfe756c05AD438e312a7fd934381537D3cFfe"),
        asset: "USDC",
        token: USDC,
        a_token: Some(address!("1D738a3436A8C49CefFbaB7fbF04B660fb528CbD")),
        decimals: STABLECOIN_DECIMALS,
        apy: "3.8",
    },
];

pub static NFT_COLLECTIONS: &[NftCollection] = &[
    NftCollection {
        name: "Caribou NFT",
        address: address!("36f4fa06Bbc44910F21db31B754fd91A699dD961"),
        image_url: "/caribou.jpg",
    },
    NftCollection {
        name: "Scroll Tarot NFT",
        address: address!("46597C6ae7a02a17038a53a207eEdaDDF565B11f"),
        image_url: "/scroll_tarot.jpg",
    },
    NftCollection {
        name: "The Maze",
        address: address!("D85F3617D147a71e5482CC2Dd789E8bB0A29E04C"),
        image_url: "/scroll_maze.jpg",
    },
];

/// Nuri concentrated-liquidity router.
pub const SWAP_ROUTER: Address = address!("AAAE99091Fbb28D400029052821653C1C752483B");

pub static SWAP_TOKENS: &[SwapToken] = &[
    SwapToken {
        symbol: "WETH",
        address: WETH,
        decimals: ETHER_DECIMALS,
    },
    SwapToken {
        symbol: "USDC",
        address: USDC,
        decimals: STABLECOIN_DECIMALS,
    },
    SwapToken {
        symbol: "USDT",
        address: USDT,
        decimals: STABLECOIN_DECIMALS,
    },
    SwapToken {
        symbol: "SCROLL",
        address: SCROLL,
        decimals: ETHER_DECIMALS,
    },
];

/// Factory exposing `getMarkets()`.
pub const PREDICTION_FACTORY: Address = address!("CAfA19a7252E58f8c7d5722117F0D3AAA6a1A28e");

pub static PREDICTION_MARKETS: &[PredictionMarketInfo] = &[
    PredictionMarketInfo {
        address: address!("9922379b9E530DE9070CaF74467CAd7B82f34Cb9"),
        description: "Will Bitcoin reach $120,000 in Q1 2025",
    },
    PredictionMarketInfo {
        address: address!("e0AE3CeEBecDdBfb92710B37f5174970f3064d95"),
        description: "Will the US confirm that aliens exist in 2025",
    },
    PredictionMarketInfo {
        address: address!("52B7d489ea8E6885C82b285b72cb5Cc22d5ec37b"),
        description: "TikTok sale announced before April",
    },
];

/// Look up a swap token by symbol (case-insensitive).
pub fn swap_token(symbol: &str) -> Option<&'static SwapToken> {
    SWAP_TOKENS
        .iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
}

/// Look up an NFT collection by exact name or by index.
pub fn nft_collection(key: &str) -> Option<&'static NftCollection> {
    key.parse::<usize>()
        .ok()
        .and_then(|i| NFT_COLLECTIONS.get(i))
        .or_else(|| NFT_COLLECTIONS.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
}

/// Look up an earn market by index or protocol (`rho`, `lore`, `aave`).
pub fn earn_market(key: &str) -> Option<&'static EarnMarket> {
    if let Ok(i) = key.parse::<usize>() {
        return EARN_MARKETS.get(i);
    }
    let key = key.to_ascii_lowercase();
    EARN_MARKETS.iter().find(|m| {
        let protocol = match m.protocol {
            Protocol::Rho => "rho",
            Protocol::Lore => "lore",
            Protocol::Aave => "aave",
        };
        protocol == key
    })
}

/// Resolve a prediction market by index into the known list or by
/// address.
pub fn prediction_market(key: &str) -> Option<Address> {
    key.parse::<usize>()
        .ok()
        .and_then(|i| PREDICTION_MARKETS.get(i))
        .map(|m| m.address)
        .or_else(|| key.parse::<Address>().ok())
}

/// Every registry address with a label, for on-chain validation.
pub fn registry_addresses() -> Vec<(String, Address)> {
    let mut out = Vec::new();
    for m in EARN_MARKETS {
        out.push((format!("{} {} pool", m.protocol, m.asset), m.address));
        if let Some(a) = m.a_token {
            out.push((format!("{} {} aToken", m.protocol, m.asset), a));
        }
    }
    for c in NFT_COLLECTIONS {
        out.push((c.name.to_string(), c.address));
    }
    out.push(("Swap router".to_string(), SWAP_ROUTER));
    for t in SWAP_TOKENS {
        out.push((t.symbol.to_string(), t.address));
    }
    out.push(("Prediction factory".to_string(), PREDICTION_FACTORY));
    for p in PREDICTION_MARKETS {
        out.push((p.description.to_string(), p.address));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_source_per_protocol() {
        assert_eq!(Protocol::Rho.balance_source(), BalanceSource::ExchangeRate);
        assert_eq!(Protocol::Lore.balance_source(), BalanceSource::AToken);
        assert_eq!(Protocol::Aave.balance_source(), BalanceSource::AToken);
    }

    #[test]
    fn test_position_token_uses_a_token_when_present() {
        let rho = &EARN_MARKETS[0];
        let lore = &EARN_MARKETS[1];
        assert_eq!(rho.position_token(), rho.address);
        assert_eq!(lore.position_token(), lore.a_token.unwrap());
    }

    #[test]
    fn test_deposit_call_dispatch() {
        let owner = Address::repeat_byte(0xAB);
        let amount = U256::from(5u8);

        let call = Protocol::Rho.deposit_call(&EARN_MARKETS[0], owner, amount);
        assert_eq!(call.method(), "mint");

        let call = Protocol::Lore.deposit_call(&EARN_MARKETS[1], owner, amount);
        assert_eq!(
            call,
            ActionCall::Deposit {
                pool: EARN_MARKETS[1].address,
                asset: EARN_MARKETS[1].token,
                amount,
                on_behalf_of: owner,
            }
        );

        let call = Protocol::Aave.deposit_call(&EARN_MARKETS[2], owner, amount);
        assert_eq!(call.method(), "supply");
    }

    #[test]
    fn test_withdraw_call_dispatch() {
        let owner = Address::repeat_byte(0xAB);
        let call = Protocol::Rho.withdraw_call(&EARN_MARKETS[0], owner, U256::from(7u8));
        assert_eq!(
            call,
            ActionCall::Redeem {
                market: EARN_MARKETS[0].address,
                shares: U256::from(7u8),
            }
        );
        let call = Protocol::Aave.withdraw_call(&EARN_MARKETS[2], owner, U256::from(7u8));
        assert_eq!(call.method(), "withdraw");
    }

    #[test]
    fn test_lookups() {
        assert_eq!(swap_token("weth").unwrap().decimals, 18);
        assert!(swap_token("DOGE").is_none());
        assert_eq!(nft_collection("1").unwrap().name, "Scroll Tarot NFT");
        assert_eq!(nft_collection("the maze").unwrap().name, "The Maze");
        assert_eq!(earn_market("AAVE").unwrap().protocol, Protocol::Aave);
        assert_eq!(earn_market("0").unwrap().protocol, Protocol::Rho);
        assert!(earn_market("3").is_none());
        assert_eq!(prediction_market("2"), Some(PREDICTION_MARKETS[2].address));
        assert_eq!(
            prediction_market("0x9922379b9E530DE9070CaF74467CAd7B82f34Cb9"),
            Some(PREDICTION_MARKETS[0].address)
        );
    }

    #[test]
    fn test_registry_addresses_cover_everything() {
        // 3 pools + 2 aTokens + 3 NFTs + router + 4 tokens + factory + 3 markets
        assert_eq!(registry_addresses().len(), 17);
    }
}
