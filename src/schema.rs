use crate::error::{ForecastReportError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Raw column names of the structured inventory table, in layout order.
pub const INVENTORY_COLUMNS: [&str; 9] = [
    "name",
    "sku",
    "category",
    "quantity",
    "threshold",
    "cost_price",
    "retail_price",
    "status",
    "location",
];

/// JSON keys every inventory item must carry.
pub const REQUIRED_INVENTORY_FIELDS: [&str; 15] = [
    "name",
    "sku",
    "tagId",
    "description",
    "category",
    "quantity",
    "threshold",
    "warehouseId",
    "zoneId",
    "shelfId",
    "binId",
    "status",
    "inventoryStatus",
    "costPrice",
    "retailPrice",
];

const LOCATION_SEPARATOR: &str = "/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[schemars(description = "Human readable product name")]
    pub name: String,

    #[schemars(description = "Stock keeping unit, e.g. SKU001")]
    pub sku: String,

    #[schemars(description = "RFID or barcode tag attached to the item")]
    pub tag_id: String,

    pub description: String,

    #[schemars(description = "Product category used for grouping in the forecast")]
    pub category: String,

    #[schemars(description = "Units currently on hand")]
    pub quantity: i64,

    #[schemars(description = "Reorder threshold; at or below this the item is low on stock")]
    pub threshold: i64,

    pub warehouse_id: String,
    pub zone_id: String,
    pub shelf_id: String,
    pub bin_id: String,

    #[schemars(description = "Catalogue status, e.g. active or discontinued")]
    pub status: String,

    #[schemars(description = "Stock status, e.g. in_stock or low_stock")]
    pub inventory_status: String,

    #[schemars(description = "Unit cost in the store currency")]
    pub cost_price: f64,

    #[schemars(description = "Unit retail price in the store currency")]
    pub retail_price: f64,
}

impl InventoryItem {
    /// `warehouse/zone/shelf/bin`.
    pub fn location(&self) -> String {
        [
            self.warehouse_id.as_str(),
            self.zone_id.as_str(),
            self.shelf_id.as_str(),
            self.bin_id.as_str(),
        ]
        .join(LOCATION_SEPARATOR)
    }

    /// Cells in [`INVENTORY_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.sku.clone(),
            self.category.clone(),
            self.quantity.to_string(),
            self.threshold.to_string(),
            format!("{:.2}", self.cost_price),
            format!("{:.2}", self.retail_price),
            self.status.clone(),
            self.location(),
        ]
    }
}

/// Parses an inventory payload, reporting every item's missing fields at once.
pub fn parse_inventory_items(json: &str) -> Result<Vec<InventoryItem>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let items = match value.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            return Err(ForecastReportError::InvalidInventory(
                "expected a non-empty array of inventory items".to_string(),
            ))
        }
    };

    let mut problems = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let missing: Vec<&str> = REQUIRED_INVENTORY_FIELDS
            .iter()
            .copied()
            .filter(|field| item.get(field).is_none())
            .collect();

        if !missing.is_empty() {
            problems.push(format!(
                "Item {} missing fields: {}",
                idx + 1,
                missing.join(", ")
            ));
        }
    }

    if !problems.is_empty() {
        return Err(ForecastReportError::InvalidInventory(problems.join("; ")));
    }

    Ok(serde_json::from_value(value)?)
}

/// JSON schema of the inventory payload accepted by [`parse_inventory_items`].
pub fn inventory_schema() -> Result<serde_json::Value> {
    let schema = schemars::schema_for!(Vec<InventoryItem>);
    Ok(serde_json::to_value(schema)?)
}
