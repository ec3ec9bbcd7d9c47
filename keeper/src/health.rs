//! Ledger invariant audit

use allocator_common::{Address, TokenId};
use allocator_portfolio::Engine;
use anyhow::{Context, Result};
use serde::Serialize;

/// Strategy snapshot
#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub id: Address,
    pub seqno: u64,
    pub tokens: Vec<TokenId>,
    pub holders: usize,
    pub shares_total: u128,
    pub shares_conserved: bool,
    pub deposit_open: bool,
    pub withdraw_open: bool,
}

/// Portfolio snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub id: Address,
    pub utilized_tokens: Vec<TokenId>,
    pub holders: usize,
    pub shares_total: u128,
    pub shares_conserved: bool,
    pub fees_valid: bool,
    pub stale: bool,
    pub outdated_references: usize,
}

/// Full audit of one engine state
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub round: u64,
    pub strategies: Vec<StrategyReport>,
    pub portfolios: Vec<PortfolioReport>,
}

impl AuditReport {
    /// Every invariant holds; staleness alone is not a violation
    pub fn is_healthy(&self) -> bool {
        self.strategies.iter().all(|s| s.shares_conserved)
            && self.portfolios.iter().all(|p| p.shares_conserved && p.fees_valid)
    }

    pub fn stale_count(&self) -> usize {
        self.portfolios.iter().filter(|p| p.stale).count()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize audit report")
    }
}

/// Snapshot every entity in `engine`
pub fn audit(engine: &Engine, round: u64) -> Result<AuditReport> {
    let strategies = engine
        .strategies()
        .values()
        .map(|s| StrategyReport {
            id: s.id,
            seqno: s.seqno(),
            tokens: s.tokens(),
            holders: s.holders().count(),
            shares_total: s.shares_total(),
            shares_conserved: s.shares_conserved(),
            deposit_open: s.is_deposit_open(),
            withdraw_open: s.is_withdraw_open(),
        })
        .collect();

    let mut portfolios = Vec::new();
    for p in engine.portfolios() {
        portfolios.push(PortfolioReport {
            id: p.id,
            utilized_tokens: p.tokens().to_vec(),
            holders: p.holders().count(),
            shares_total: p.shares_total(),
            shares_conserved: p.shares_conserved(),
            fees_valid: p.fees_valid(),
            stale: p
                .is_stale(engine.strategies())
                .with_context(|| format!("staleness check for {}", p.id))?,
            outdated_references: p
                .outdated_references(engine.strategies())
                .with_context(|| format!("reference check for {}", p.id))?,
        });
    }

    Ok(AuditReport {
        round,
        strategies,
        portfolios,
    })
}
