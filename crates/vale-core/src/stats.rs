//! Dashboard aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::Vale;
use crate::status::{StatusPolicy, ValeStatus};

/// Voucher counts for one creation month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    /// Month in `YYYY-MM` form
    pub mes: String,
    /// Open vouchers created that month
    pub acumulado: u64,
    /// Settled vouchers created that month
    pub processado: u64,
    /// Expired vouchers created that month
    pub vencido: u64,
}

/// Summary shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Open vouchers
    pub acumulado: u64,
    /// Settled vouchers
    pub processado: u64,
    /// Expired vouchers
    pub vencido: u64,
    /// Registered clients
    pub clientes: u64,
    /// Registered carriers
    pub transportadoras: u64,
    /// Total value of open vouchers
    pub valor_acumulado: f64,
    /// Per-month breakdown, oldest first
    pub por_mes: Vec<MonthlyStats>,
}

impl DashboardStats {
    /// Aggregates `vales` using their effective status on `today`.
    pub fn compute(
        vales: &[Vale],
        clientes: u64,
        transportadoras: u64,
        policy: &StatusPolicy,
        today: NaiveDate,
    ) -> Self {
        let mut stats = Self {
            clientes,
            transportadoras,
            ..Self::default()
        };
        let mut months: BTreeMap<String, MonthlyStats> = BTreeMap::new();

        for vale in vales {
            let mes = vale.data_criacao.format("%Y-%m").to_string();
            let month = months.entry(mes.clone()).or_insert_with(|| MonthlyStats {
                mes,
                ..MonthlyStats::default()
            });

            match policy.effective_status(vale, today) {
                ValeStatus::Acumulado => {
                    stats.acumulado += 1;
                    stats.valor_acumulado += vale.valor_total();
                    month.acumulado += 1;
                }
                ValeStatus::Processado => {
                    stats.processado += 1;
                    month.processado += 1;
                }
                ValeStatus::Vencido => {
                    stats.vencido += 1;
                    month.vencido += 1;
                }
            }
        }

        stats.por_mes = months.into_values().collect();
        stats
    }
}
