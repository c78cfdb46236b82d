use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form JSON fields kept exactly as the client sent them.
pub type Fields = serde_json::Map<String, Value>;

pub const CHECKED_ITEMS: &str = "checkedItems";
const ID: &str = "_id";

/// A shopping trip. Only the server-assigned id is typed; the rest of the
/// document, `checkedItems` included, is kept as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingTrip {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl ShoppingTrip {
    pub fn new(id: String, mut fields: Fields) -> Self {
        fields.remove(ID);
        Self { id, fields }
    }

    /// Object entries of `checkedItems`. Anything else in the array is skipped.
    pub fn checked_items(&self) -> impl Iterator<Item = &Fields> {
        self.fields
            .get(CHECKED_ITEMS)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    pub fn item(&self, item_id: &str) -> Option<CheckedItem> {
        self.checked_items()
            .find(|item| has_id(item, item_id))
            .cloned()
            .map(|fields| CheckedItem { fields })
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Fields> {
        self.fields
            .get_mut(CHECKED_ITEMS)?
            .as_array_mut()?
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|item| has_id(item, item_id))
    }

    /// Appends to `checkedItems`, creating it when absent. Returns false when
    /// the field holds something other than an array.
    pub fn push_item(&mut self, item: CheckedItem) -> bool {
        match self
            .fields
            .entry(CHECKED_ITEMS)
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(Value::Object(item.fields));
                true
            }
            _ => false,
        }
    }

    /// Removes every item carrying `item_id`; true when something went.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let Some(items) = self
            .fields
            .get_mut(CHECKED_ITEMS)
            .and_then(Value::as_array_mut)
        else {
            return false;
        };
        let before = items.len();
        items.retain(|item| !item.as_object().is_some_and(|item| has_id(item, item_id)));
        items.len() != before
    }
}

fn has_id(item: &Fields, item_id: &str) -> bool {
    item.get(ID).and_then(Value::as_str) == Some(item_id)
}

/// One line of a trip, stored verbatim. The id is only unique within its
/// parent trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CheckedItem {
    pub fields: Fields,
}

impl CheckedItem {
    /// Stamps `id` over whatever `_id` the body carried.
    pub fn with_id(mut fields: Fields, id: String) -> Self {
        fields.insert(ID.to_string(), Value::String(id));
        Self { fields }
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID).and_then(Value::as_str)
    }
}

/// Body of an item update. A missing field is written as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub unit: Value,
}

impl ItemUpdate {
    /// Overwrites the three editable fields, leaving id and extras alone.
    pub fn apply(&self, item: &mut Fields) {
        item.insert("name".to_string(), self.name.clone());
        item.insert("quantity".to_string(), self.quantity.clone());
        item.insert("unit".to_string(), self.unit.clone());
    }
}

/// Read-only reference entry from the `shoppingList` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingListEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: Fields,
}
