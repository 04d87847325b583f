// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    CustomerOrderFulfillment,
    DemandSupplyMatching,
    SupplierRiskAssessment,
    DemandForecasting,
    TransportationOptimization,
    InventoryOptimization,
}

#[derive(Debug, Clone, Error)]
#[error("unknown scenario: {0}")]
pub struct UnknownScenario(pub String);

impl Scenario {
    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::CustomerOrderFulfillment,
            Scenario::DemandSupplyMatching,
            Scenario::SupplierRiskAssessment,
            Scenario::DemandForecasting,
            Scenario::TransportationOptimization,
            Scenario::InventoryOptimization,
        ]
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Scenario::CustomerOrderFulfillment => "customer-order-fulfillment",
            Scenario::DemandSupplyMatching => "demand-supply-matching",
            Scenario::SupplierRiskAssessment => "supplier-risk-assessment",
            Scenario::DemandForecasting => "demand-forecasting",
            Scenario::TransportationOptimization => "transportation-optimization",
            Scenario::InventoryOptimization => "inventory-optimization",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Scenario::CustomerOrderFulfillment => "Customer Order Fulfillment",
            Scenario::DemandSupplyMatching => "Demand-Supply Matching",
            Scenario::SupplierRiskAssessment => "Supplier Risk Assessment",
            Scenario::DemandForecasting => "Demand Forecasting",
            Scenario::TransportationOptimization => "Transportation Optimization",
            Scenario::InventoryOptimization => "Inventory Optimization",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::CustomerOrderFulfillment => {
                "Fulfil customer orders from multiple warehouses at minimal shipping cost"
            }
            Scenario::DemandSupplyMatching => {
                "Match plant supply to retail store demand at minimal distribution cost"
            }
            Scenario::SupplierRiskAssessment => {
                "Select suppliers to meet demand while bounding procurement cost and risk"
            }
            Scenario::DemandForecasting => {
                "Forecast monthly product demand from historical sales and seasonality"
            }
            Scenario::TransportationOptimization => {
                "Route goods from warehouses to customers at minimal transportation cost"
            }
            Scenario::InventoryOptimization => {
                "Balance warehouse inventory levels against holding cost and demand"
            }
        }
    }

    pub fn from_slug(slug: &str) -> Result<Scenario, UnknownScenario> {
        Scenario::all()
            .iter()
            .copied()
            .find(|s| s.slug() == slug)
            .ok_or_else(|| UnknownScenario(slug.to_string()))
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_roundtrip() {
        for scenario in Scenario::all() {
            assert_eq!(Scenario::from_slug(scenario.slug()).unwrap(), *scenario);
        }
    }

    #[test]
    fn test_unknown_slug_is_rejected() {
        let err = Scenario::from_slug("warehouse-tetris").unwrap_err();
        assert!(err.to_string().contains("warehouse-tetris"));
    }

    #[test]
    fn test_serde_uses_slug_form() {
        let json = serde_json::to_string(&Scenario::DemandSupplyMatching).unwrap();
        assert_eq!(json, "\"demand-supply-matching\"");
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Scenario::DemandSupplyMatching);
    }
}
