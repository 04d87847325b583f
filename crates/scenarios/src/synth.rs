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

use crate::catalogue::Scenario;
use crate::table::{columns, CellValue, DataTable};
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Word;
use fake::faker::name::en::FirstName;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioData {
    pub scenario: Scenario,
    pub seed: u64,
    pub problem_statement: String,
    pub objective: String,
    pub constraints: String,
    pub tables: Vec<DataTable>,
}

impl ScenarioData {
    pub fn tables_markdown(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&format!("### {}\n\n", table.name));
            out.push_str(&table.to_markdown());
            out.push('\n');
        }
        out
    }
}

pub fn generate(scenario: Scenario, seed: u64) -> ScenarioData {
    let mut rng = StdRng::seed_from_u64(seed);
    match scenario {
        Scenario::CustomerOrderFulfillment => customer_order_fulfillment(&mut rng, seed),
        Scenario::DemandSupplyMatching => demand_supply_matching(&mut rng, seed),
        Scenario::SupplierRiskAssessment => supplier_risk(&mut rng, seed),
        Scenario::DemandForecasting => demand_forecasting(&mut rng, seed),
        Scenario::TransportationOptimization => transportation(&mut rng, seed),
        Scenario::InventoryOptimization => inventory(&mut rng, seed),
    }
}

fn customer_order_fulfillment(rng: &mut StdRng, seed: u64) -> ScenarioData {
    let num_customers = 2;
    let num_warehouses = 3;

    let customers: Vec<String> = (0..num_customers)
        .map(|_| format!("Customer_{}", FirstName().fake_with_rng::<String, _>(rng)))
        .collect();
    let demand: Vec<i64> = (0..num_customers)
        .map(|_| rng.random_range(50..150))
        .collect();
    let warehouses: Vec<String> = (0..num_warehouses)
        .map(|_| format!("Warehouse_{}", CityName().fake_with_rng::<String, _>(rng)))
        .collect();
    let supply: Vec<i64> = (0..num_warehouses)
        .map(|_| rng.random_range(100..300))
        .collect();
    let shipping_costs: Vec<Vec<i64>> = (0..num_customers)
        .map(|_| (0..num_warehouses).map(|_| rng.random_range(1..10)).collect())
        .collect();

    let mut demand_table = DataTable::new(
        "Customer Demand (Units)",
        columns(&["Customer Name", "Demand (Units)"]),
    );
    for (customer, units) in customers.iter().zip(&demand) {
        demand_table.push_row(vec![customer.clone().into(), (*units).into()]);
    }

    let mut supply_table = DataTable::new(
        "Warehouse Supply (Units)",
        columns(&["Warehouse", "Supply (Units)"]),
    );
    for (warehouse, units) in warehouses.iter().zip(&supply) {
        supply_table.push_row(vec![warehouse.clone().into(), (*units).into()]);
    }

    let mut cost_columns = vec!["Customer Name".to_string()];
    cost_columns.extend(
        warehouses
            .iter()
            .map(|w| format!("{w} (Shipping Cost USD)")),
    );
    let mut cost_table = DataTable::new("Shipping Costs (USD)", cost_columns);
    for (customer, row) in customers.iter().zip(&shipping_costs) {
        let mut cells: Vec<CellValue> = vec![customer.clone().into()];
        cells.extend(row.iter().map(|c| CellValue::Int(*c)));
        cost_table.push_row(cells);
    }

    ScenarioData {
        scenario: Scenario::CustomerOrderFulfillment,
        seed,
        problem_statement: "A company needs to fulfil customer orders from multiple warehouses \
            while minimising shipping costs. Each customer has a specific demand (in units), and \
            each warehouse has a limited supply of products (in units). The cost of shipping \
            products (in USD) from warehouses to customers varies with distance and logistics."
            .to_string(),
        objective: "Minimise the total shipping cost (in USD) while fulfilling all customer \
            orders (in units)."
            .to_string(),
        constraints: "1. Each customer's demand (in units) must be fully satisfied.\n\
            2. Each warehouse can only ship products up to its available supply (in units).\n\
            3. Shipping costs vary between different warehouse-customer pairs (in USD)."
            .to_string(),
        tables: vec![demand_table, supply_table, cost_table],
    }
}

fn demand_supply_matching(rng: &mut StdRng, seed: u64) -> ScenarioData {
    let num_stores = 3;
    let num_plants = 3;

    let stores: Vec<String> = (0..num_stores)
        .map(|_| format!("Store_{}", CityName().fake_with_rng::<String, _>(rng)))
        .collect();
    let plants: Vec<String> = (0..num_plants)
        .map(|_| format!("Plant_{}", CityName().fake_with_rng::<String, _>(rng)))
        .collect();
    let demand: Vec<i64> = (0..num_stores)
        .map(|_| rng.random_range(100..500))
        .collect();
    let supply: Vec<i64> = (0..num_plants)
        .map(|_| rng.random_range(200..600))
        .collect();
    let distribution_costs: Vec<Vec<i64>> = (0..num_stores)
        .map(|_| (0..num_plants).map(|_| rng.random_range(5..20)).collect())
        .collect();

    let mut demand_table = DataTable::new(
        "Store Demand (Units)",
        columns(&["Store Name", "Demand (Units)"]),
    );
    for (store, units) in stores.iter().zip(&demand) {
        demand_table.push_row(vec![store.clone().into(), (*units).into()]);
    }

    let mut supply_table = DataTable::new(
        "Plant Supply (Units)",
        columns(&["Plant Name", "Supply (Units)"]),
    );
    for (plant, units) in plants.iter().zip(&supply) {
        supply_table.push_row(vec![plant.clone().into(), (*units).into()]);
    }

    let mut cost_columns = vec!["Store Name".to_string()];
    cost_columns.extend(plants.iter().map(|p| format!("{p} (Distribution Cost USD)")));
    let mut cost_table = DataTable::new("Distribution Costs (USD)", cost_columns);
    for (store, row) in stores.iter().zip(&distribution_costs) {
        let mut cells: Vec<CellValue> = vec![store.clone().into()];
        cells.extend(row.iter().map(|c| CellValue::Int(*c)));
        cost_table.push_row(cells);
    }

    ScenarioData {
        scenario: Scenario::DemandSupplyMatching,
        seed,
        problem_statement: "A company needs to match the product supply from manufacturing \
            plants to the demand from retail stores while minimising distribution costs. Each \
            store has a specific demand (in units), and each plant has a limited supply capacity \
            (in units). The cost of distributing products (in USD) from plants to stores varies \
            with transportation, distance, and handling."
            .to_string(),
        objective: "Minimise the total distribution cost (in USD) while fulfilling all store \
            demands (in units) and respecting the plant supply capacity."
            .to_string(),
        constraints: "1. No plant can exceed its production capacity (in units).\n\
            2. Each store's demand (in units) must be fully satisfied."
            .to_string(),
        tables: vec![demand_table, supply_table, cost_table],
    }
}

fn supplier_risk(rng: &mut StdRng, seed: u64) -> ScenarioData {
    let num_suppliers = 5;
    let demand = 1000;
    let risk_threshold = 0.2;

    let suppliers: Vec<String> = (0..num_suppliers)
        .map(|_| format!("Supplier_{}", CompanyName().fake_with_rng::<String, _>(rng)))
        .collect();
    let capacity: Vec<i64> = (0..num_suppliers)
        .map(|_| rng.random_range(200..500))
        .collect();
    let procurement_costs: Vec<i64> = (0..num_suppliers)
        .map(|_| rng.random_range(50..150))
        .collect();
    let risk_scores: Vec<f64> = (0..num_suppliers).map(|_| rng.random::<f64>()).collect();

    let mut capacity_table = DataTable::new(
        "Supplier Capacity (Units)",
        columns(&["Supplier Name", "Supply Capacity (Units)"]),
    );
    for (supplier, units) in suppliers.iter().zip(&capacity) {
        capacity_table.push_row(vec![supplier.clone().into(), (*units).into()]);
    }

    let mut cost_table = DataTable::new(
        "Procurement Cost (USD/Unit)",
        columns(&["Supplier Name", "Procurement Cost (USD/Unit)"]),
    );
    for (supplier, cost) in suppliers.iter().zip(&procurement_costs) {
        cost_table.push_row(vec![supplier.clone().into(), (*cost).into()]);
    }

    let mut risk_table = DataTable::new(
        "Supplier Risk (Score)",
        columns(&["Supplier Name", "Risk Score (0-1)"]),
    );
    for (supplier, score) in suppliers.iter().zip(&risk_scores) {
        risk_table.push_row(vec![supplier.clone().into(), (*score).into()]);
    }

    ScenarioData {
        scenario: Scenario::SupplierRiskAssessment,
        seed,
        problem_statement: "A company must select suppliers to meet its demand while minimising \
            both procurement costs and supply chain risk. Each supplier has a limited capacity \
            (in units), a cost per unit (in USD), and an associated risk score (between 0 and 1). \
            The goal is to meet the company's total demand by sourcing products from these \
            suppliers while keeping the overall risk below a certain threshold."
            .to_string(),
        objective: "Minimise the total procurement cost (in USD) while keeping the overall risk \
            below the risk threshold and meeting the demand."
            .to_string(),
        constraints: format!(
            "1. The total supply from selected suppliers must meet the company's demand of \
            {demand} units.\n\
            2. No supplier can exceed their capacity limit (in units).\n\
            3. The overall supply risk must stay below the risk threshold of {risk_threshold}.\n\
            4. The cost of procurement should be minimised."
        ),
        tables: vec![capacity_table, cost_table, risk_table],
    }
}

fn demand_forecasting(rng: &mut StdRng, seed: u64) -> ScenarioData {
    let num_products = 5;
    let num_months = 12;

    let products: Vec<String> = (0..num_products)
        .map(|_| format!("Product_{}", Word().fake_with_rng::<String, _>(rng)))
        .collect();
    let historical: Vec<Vec<i64>> = (0..num_products)
        .map(|_| {
            (0..num_months)
                .map(|_| rng.random_range(1000..5000))
                .collect()
        })
        .collect();
    let base_forecast: Vec<f64> = historical
        .iter()
        .map(|row| {
            let mean = row.iter().sum::<i64>() as f64 / num_months as f64;
            mean + rng.random_range(-500..500) as f64
        })
        .collect();
    let seasonal: Vec<f64> = (0..num_months)
        .map(|month| {
            let angle = month as f64 * std::f64::consts::TAU / (num_months - 1) as f64;
            angle.sin() + rng.random_range(-0.1..0.1)
        })
        .collect();
    let forecast: Vec<Vec<f64>> = base_forecast
        .iter()
        .map(|base| {
            seasonal
                .iter()
                .map(|factor| base * factor + rng.random_range(-200..200) as f64)
                .collect()
        })
        .collect();

    let month_columns = |label: &str| {
        let mut cols = vec![label.to_string()];
        cols.extend((1..=num_months).map(|m| format!("Month_{m}")));
        cols
    };

    let mut historical_table =
        DataTable::new("Historical Sales (Units)", month_columns("Product Name"));
    for (product, row) in products.iter().zip(&historical) {
        let mut cells: Vec<CellValue> = vec![product.clone().into()];
        cells.extend(row.iter().map(|v| CellValue::Int(*v)));
        historical_table.push_row(cells);
    }

    let mut forecast_table =
        DataTable::new("Forecasted Demand (Units)", month_columns("Product Name"));
    for (product, row) in products.iter().zip(&forecast) {
        let mut cells: Vec<CellValue> = vec![product.clone().into()];
        cells.extend(row.iter().map(|v| CellValue::Float(*v)));
        forecast_table.push_row(cells);
    }

    let mut seasonal_table = DataTable::new("Seasonal Factors", month_columns("Series"));
    let mut cells: Vec<CellValue> = vec!["Seasonal Factors".into()];
    cells.extend(seasonal.iter().map(|v| CellValue::Float(*v)));
    seasonal_table.push_row(cells);

    ScenarioData {
        scenario: Scenario::DemandForecasting,
        seed,
        problem_statement: "The company needs to forecast the monthly demand for its products \
            over the next 12 months. The forecasting model should use historical sales data and \
            account for seasonal variations to predict future demand accurately."
            .to_string(),
        objective: "Accurately forecast the monthly demand for each product to optimise \
            inventory levels and improve supply chain efficiency."
            .to_string(),
        constraints: "1. The forecast should be based on historical sales data and seasonal \
            patterns.\n\
            2. The forecasting model should achieve a reasonable level of accuracy.\n\
            3. Seasonal factors and potential anomalies should be considered in the forecast."
            .to_string(),
        tables: vec![historical_table, forecast_table, seasonal_table],
    }
}

fn transportation(rng: &mut StdRng, seed: u64) -> ScenarioData {
    let num_customers = 5;
    let num_warehouses = 3;

    let customers: Vec<String> = (0..num_customers)
        .map(|_| format!("Customer_{}", FirstName().fake_with_rng::<String, _>(rng)))
        .collect();
    let warehouses: Vec<String> = (1..=num_warehouses)
        .map(|j| format!("Warehouse_{j}"))
        .collect();
    let shipping_costs: Vec<Vec<f64>> = (0..num_customers)
        .map(|_| {
            (0..num_warehouses)
                .map(|_| rng.random_range(1.0..10.0))
                .collect()
        })
        .collect();
    let capacities: Vec<i64> = (0..num_warehouses)
        .map(|_| rng.random_range(200..1000))
        .collect();
    let demand: Vec<i64> = (0..num_customers)
        .map(|_| rng.random_range(100..500))
        .collect();

    let mut cost_columns = vec!["Customer Name".to_string()];
    cost_columns.extend(warehouses.iter().cloned());
    let mut cost_table = DataTable::new("Shipping Costs", cost_columns);
    for (customer, row) in customers.iter().zip(&shipping_costs) {
        let mut cells: Vec<CellValue> = vec![customer.clone().into()];
        cells.extend(row.iter().map(|c| CellValue::Float(*c)));
        cost_table.push_row(cells);
    }

    let mut capacity_table =
        DataTable::new("Warehouse Capacities", columns(&["Warehouse", "Capacity"]));
    for (warehouse, capacity) in warehouses.iter().zip(&capacities) {
        capacity_table.push_row(vec![warehouse.clone().into(), (*capacity).into()]);
    }

    let mut demand_table = DataTable::new("Customer Demand", columns(&["Customer Name", "Demand"]));
    for (customer, units) in customers.iter().zip(&demand) {
        demand_table.push_row(vec![customer.clone().into(), (*units).into()]);
    }

    ScenarioData {
        scenario: Scenario::TransportationOptimization,
        seed,
        problem_statement: "Optimise the transportation of goods from warehouses to customers \
            to minimise transportation costs while ensuring timely delivery."
            .to_string(),
        objective: "Minimise the total transportation cost while meeting delivery deadlines and \
            customer demands."
            .to_string(),
        constraints: "1. Each route has a cost and capacity limit.\n\
            2. Delivery deadlines must be met.\n\
            3. The total amount shipped must meet customer demand."
            .to_string(),
        tables: vec![cost_table, capacity_table, demand_table],
    }
}

fn inventory(rng: &mut StdRng, seed: u64) -> ScenarioData {
    let num_products = 5;
    let num_warehouses = 3;

    let products: Vec<String> = (0..num_products)
        .map(|_| format!("Product_{}", Word().fake_with_rng::<String, _>(rng)))
        .collect();
    let warehouses: Vec<String> = (1..=num_warehouses)
        .map(|j| format!("Warehouse_{j}"))
        .collect();
    let holding_costs: Vec<f64> = (0..num_products)
        .map(|_| rng.random_range(1.0..10.0))
        .collect();
    let capacities: Vec<i64> = (0..num_warehouses)
        .map(|_| rng.random_range(500..2000))
        .collect();
    let demand_forecast: Vec<Vec<i64>> = (0..num_products)
        .map(|_| {
            (0..num_warehouses)
                .map(|_| rng.random_range(50..200))
                .collect()
        })
        .collect();

    let mut holding_table = DataTable::new(
        "Holding Costs",
        columns(&["Product Name", "Holding Cost per Unit"]),
    );
    for (product, cost) in products.iter().zip(&holding_costs) {
        holding_table.push_row(vec![product.clone().into(), (*cost).into()]);
    }

    let mut capacity_table =
        DataTable::new("Warehouse Capacities", columns(&["Warehouse", "Capacity"]));
    for (warehouse, capacity) in warehouses.iter().zip(&capacities) {
        capacity_table.push_row(vec![warehouse.clone().into(), (*capacity).into()]);
    }

    let mut forecast_columns = vec!["Product Name".to_string()];
    forecast_columns.extend(warehouses.iter().cloned());
    let mut forecast_table = DataTable::new("Demand Forecast", forecast_columns);
    for (product, row) in products.iter().zip(&demand_forecast) {
        let mut cells: Vec<CellValue> = vec![product.clone().into()];
        cells.extend(row.iter().map(|v| CellValue::Int(*v)));
        forecast_table.push_row(cells);
    }

    ScenarioData {
        scenario: Scenario::InventoryOptimization,
        seed,
        problem_statement: "Optimise inventory levels across multiple warehouses to minimise \
            holding costs while meeting customer demand. The company faces trade-offs between \
            holding too much inventory (high holding costs) and too little (stockouts)."
            .to_string(),
        objective: "Minimise the total holding costs while maintaining sufficient inventory \
            levels to meet customer demand."
            .to_string(),
        constraints: "1. Inventory levels should meet the forecasted demand.\n\
            2. Each warehouse has a maximum storage capacity.\n\
            3. Holding costs must be minimised."
            .to_string(),
        tables: vec![holding_table, capacity_table, forecast_table],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_seed_is_reproducible() {
        for scenario in Scenario::all() {
            let first = generate(*scenario, DEFAULT_SEED);
            let second = generate(*scenario, DEFAULT_SEED);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap(),
                "scenario {scenario} diverged for a fixed seed"
            );
        }
    }

    #[test]
    fn test_different_seeds_produce_different_tables() {
        let a = generate(Scenario::DemandSupplyMatching, 1);
        let b = generate(Scenario::DemandSupplyMatching, 2);
        assert_ne!(
            serde_json::to_string(&a.tables).unwrap(),
            serde_json::to_string(&b.tables).unwrap()
        );
    }

    #[test]
    fn test_order_fulfillment_values_stay_in_range() {
        let data = generate(Scenario::CustomerOrderFulfillment, 7);
        let demand = &data.tables[0];
        for row in &demand.rows {
            match &row[1] {
                CellValue::Int(v) => assert!((50..150).contains(v)),
                other => panic!("expected integer demand, got {other:?}"),
            }
        }
        let supply = &data.tables[1];
        for row in &supply.rows {
            match &row[1] {
                CellValue::Int(v) => assert!((100..300).contains(v)),
                other => panic!("expected integer supply, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_supplier_risk_scores_are_unit_interval() {
        let data = generate(Scenario::SupplierRiskAssessment, 11);
        let risk = data
            .tables
            .iter()
            .find(|t| t.name == "Supplier Risk (Score)")
            .unwrap();
        for row in &risk.rows {
            match &row[1] {
                CellValue::Float(v) => assert!((0.0..1.0).contains(v)),
                other => panic!("expected float risk score, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_forecasting_shapes() {
        let data = generate(Scenario::DemandForecasting, 3);
        let historical = &data.tables[0];
        assert_eq!(historical.columns.len(), 13);
        assert_eq!(historical.rows.len(), 5);
        let seasonal = &data.tables[2];
        assert_eq!(seasonal.rows.len(), 1);
    }

    #[test]
    fn test_markdown_contains_every_table() {
        let data = generate(Scenario::InventoryOptimization, 5);
        let md = data.tables_markdown();
        for table in &data.tables {
            assert!(md.contains(&format!("### {}", table.name)));
        }
    }
}
