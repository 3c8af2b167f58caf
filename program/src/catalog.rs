use anchor_lang::prelude::*;

use crate::{
    constants::{BASIS_POINTS_TOTAL, TOKEN_UNIT},
    errors::LedgerError,
    state::Money,
};

/// Purchasable tier and its payment split
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Package {
    /// Catalog level (1-based)
    pub level: u8,
    /// Price in token base units
    pub price: Money,
    /// Share paid to the direct sponsor
    pub direct_bps: u16,
    /// Share split across upline levels 1..=10
    pub level_bps: u16,
    /// Share split evenly across the 30 upline slots
    pub upline_bps: u16,
    /// Share accrued to the Leader pool
    pub leader_bps: u16,
    /// Share accrued to the Help pool (absorbs rounding)
    pub help_bps: u16,
}

impl Package {
    /// Package with the standard 40/10/10/10/30 split.
    #[must_use]
    pub const fn standard(level: u8, price: Money) -> Self {
        Self {
            level,
            price,
            direct_bps: 4_000,
            level_bps: 1_000,
            upline_bps: 1_000,
            leader_bps: 1_000,
            help_bps: 3_000,
        }
    }

    #[must_use]
    pub fn bps_total(&self) -> u32 {
        [
            self.direct_bps,
            self.level_bps,
            self.upline_bps,
            self.leader_bps,
            self.help_bps,
        ]
        .iter()
        .map(|bps| u32::from(*bps))
        .sum()
    }

    /// # Errors
    /// Returns `InvalidConfiguration` for level 0, a zero price, or a split that
    /// does not sum to 10,000 bps.
    pub fn validate(&self) -> Result<()> {
        require!(self.level >= 1, LedgerError::InvalidConfiguration);
        require!(self.price > 0, LedgerError::InvalidConfiguration);
        require!(
            self.bps_total() == u32::from(BASIS_POINTS_TOTAL),
            LedgerError::InvalidConfiguration
        );
        Ok(())
    }
}

/// Immutable table of packages, sorted by level
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PackageCatalog {
    packages: Vec<Package>,
}

impl PackageCatalog {
    /// Validates and loads a package table.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if the table is empty, a level repeats, or any
    /// package fails [`Package::validate`].
    pub fn new(mut packages: Vec<Package>) -> Result<Self> {
        require!(!packages.is_empty(), LedgerError::InvalidConfiguration);
        for package in &packages {
            package.validate()?;
        }
        packages.sort_by_key(|package| package.level);
        let unique = packages
            .windows(2)
            .all(|pair| pair[0].level != pair[1].level);
        require!(unique, LedgerError::InvalidConfiguration);
        Ok(Self { packages })
    }

    /// The four canonical tiers: 30, 50, 100, and 200 USDT.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            packages: vec![
                Package::standard(1, 30_u64.saturating_mul(TOKEN_UNIT)),
                Package::standard(2, 50_u64.saturating_mul(TOKEN_UNIT)),
                Package::standard(3, 100_u64.saturating_mul(TOKEN_UNIT)),
                Package::standard(4, 200_u64.saturating_mul(TOKEN_UNIT)),
            ],
        }
    }

    /// # Errors
    /// Returns `InvalidLevel` when `level` is not in the table.
    pub fn lookup(&self, level: u8) -> Result<&Package> {
        self.packages
            .iter()
            .find(|package| package.level == level)
            .ok_or_else(|| LedgerError::InvalidLevel.into())
    }

    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
