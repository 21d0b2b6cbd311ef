//! Shared shop fixture: native types covering every field kind, bound through
//! properties sources the way an application would bind them.

#![allow(dead_code)]

use std::sync::Arc;

use protojson_core::{
    BuildError, DynamicMessage, EnumDescriptor, FieldDescriptor, FieldKind, MapEntryDescriptor,
    MapValue, MessageBuilder, NativeEnum, NativeMessage, ScalarType, SchemaDescriptor, Value,
};
use protojson_registry::{ClassPath, NativeCatalog, RegistryConfig, TypeRegistry};

pub const MESSAGE_BINDINGS: &str = "\
# shop schemas
shop.Order    = shop::Order
shop.Customer = shop::Customer
shop.Line     = shop::Line
";

pub const ENUM_BINDINGS: &str = "shop.Status = shop::Status\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unknown = 0,
    Paid = 1,
    Shipped = 2,
}

impl NativeEnum for Status {
    const TYPE_NAME: &'static str = "shop::Status";

    fn descriptor() -> EnumDescriptor {
        EnumDescriptor::new(
            "shop.Status",
            [("STATUS_UNKNOWN", 0), ("PAID", 1), ("SHIPPED", 2)],
        )
    }

    fn number(self) -> i32 {
        self as i32
    }

    fn from_number(number: i32) -> Option<Self> {
        match number {
            0 => Some(Status::Unknown),
            1 => Some(Status::Paid),
            2 => Some(Status::Shipped),
            _ => None,
        }
    }
}

fn required<'m>(message: &'m DynamicMessage, type_name: &str, field: &str) -> Result<&'m Value, BuildError> {
    message.get(field).ok_or_else(|| BuildError::Native {
        type_name: type_name.to_string(),
        reason: format!("{field} is required"),
    })
}

/// A customer must have a display name.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub display_name: String,
    pub email: String,
}

impl NativeMessage for Customer {
    const TYPE_NAME: &'static str = "shop::Customer";

    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "shop.Customer",
            vec![
                FieldDescriptor::singular("display_name", FieldKind::scalar(ScalarType::String)),
                FieldDescriptor::singular("email", FieldKind::scalar(ScalarType::String)),
            ],
        )
    }

    fn to_message(&self) -> Result<DynamicMessage, BuildError> {
        let mut builder = MessageBuilder::new(Arc::new(Self::descriptor()));
        builder
            .set("display_name", self.display_name.as_str())?
            .set("email", self.email.as_str())?;
        builder.build()
    }

    fn from_message(message: &DynamicMessage) -> Result<Self, BuildError> {
        let display_name = required(message, Self::TYPE_NAME, "display_name")?
            .as_str()
            .unwrap_or_default()
            .to_string();
        let email = message.get("email").and_then(Value::as_str).unwrap_or_default().to_string();
        Ok(Customer { display_name, email })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub sku: String,
    pub qty: i32,
}

impl NativeMessage for Line {
    const TYPE_NAME: &'static str = "shop::Line";

    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "shop.Line",
            vec![
                FieldDescriptor::singular("sku", FieldKind::scalar(ScalarType::String)),
                FieldDescriptor::singular("qty", FieldKind::scalar(ScalarType::Int32)),
            ],
        )
    }

    fn to_message(&self) -> Result<DynamicMessage, BuildError> {
        let mut builder = MessageBuilder::new(Arc::new(Self::descriptor()));
        builder.set("sku", self.sku.as_str())?.set("qty", self.qty)?;
        builder.build()
    }

    fn from_message(message: &DynamicMessage) -> Result<Self, BuildError> {
        Ok(Line {
            sku: message.get("sku").and_then(Value::as_str).unwrap_or_default().to_string(),
            qty: message.get("qty").and_then(Value::as_i32).unwrap_or_default(),
        })
    }
}

/// Every field kind and cardinality.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: i64,
    pub customer: Option<Customer>,
    pub status: Status,
    pub lines: Vec<Line>,
    pub counts: Vec<(String, i32)>,
    pub receipt: Vec<u8>,
    pub total: f64,
    pub weight: f32,
    pub gift: bool,
    pub note: Option<String>,
    pub priority: i32,
}

impl Default for Order {
    fn default() -> Self {
        Order {
            order_id: 0,
            customer: None,
            status: Status::Unknown,
            lines: Vec::new(),
            counts: Vec::new(),
            receipt: Vec::new(),
            total: 0.0,
            weight: 0.0,
            gift: false,
            note: None,
            priority: 0,
        }
    }
}

impl NativeMessage for Order {
    const TYPE_NAME: &'static str = "shop::Order";

    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor::new(
            "shop.Order",
            vec![
                FieldDescriptor::singular("order_id", FieldKind::scalar(ScalarType::Int64)),
                FieldDescriptor::singular("customer", FieldKind::message("shop.Customer")),
                FieldDescriptor::singular("status", FieldKind::enumeration("shop.Status")),
                FieldDescriptor::repeated("lines", FieldKind::message("shop.Line")),
                FieldDescriptor::map(
                    "counts",
                    MapEntryDescriptor::new(
                        "shop.Order.CountsEntry",
                        FieldKind::scalar(ScalarType::String),
                        FieldKind::scalar(ScalarType::Int32),
                    ),
                ),
                FieldDescriptor::singular("receipt", FieldKind::Bytes),
                FieldDescriptor::singular("total", FieldKind::scalar(ScalarType::Double)),
                FieldDescriptor::singular("weight", FieldKind::scalar(ScalarType::Float)),
                FieldDescriptor::singular("gift", FieldKind::scalar(ScalarType::Bool)),
                FieldDescriptor::singular("note", FieldKind::scalar(ScalarType::String))
                    .with_explicit_presence(),
                FieldDescriptor::singular("priority", FieldKind::scalar(ScalarType::Int32))
                    .with_json_name("prio"),
            ],
        )
    }

    fn to_message(&self) -> Result<DynamicMessage, BuildError> {
        let mut builder = MessageBuilder::new(Arc::new(Self::descriptor()));
        builder
            .set("order_id", self.order_id)?
            .set("status", self.status.to_value()?)?
            .set("receipt", self.receipt.clone())?
            .set("total", self.total)?
            .set("weight", self.weight)?
            .set("gift", self.gift)?
            .set("priority", self.priority)?;
        if let Some(customer) = &self.customer {
            builder.set("customer", customer.to_message()?)?;
        }
        for line in &self.lines {
            builder.push("lines", line.to_message()?)?;
        }
        let counts: MapValue = self
            .counts
            .iter()
            .map(|(k, v)| (Value::from(k.as_str()), Value::from(*v)))
            .collect();
        builder.set("counts", counts)?;
        if let Some(note) = &self.note {
            builder.set("note", note.as_str())?;
        }
        builder.build()
    }

    fn from_message(message: &DynamicMessage) -> Result<Self, BuildError> {
        let customer = message
            .get("customer")
            .and_then(Value::as_message)
            .map(Customer::from_message)
            .transpose()?;
        let status = message
            .get("status")
            .map(Status::from_value)
            .transpose()?
            .unwrap_or(Status::Unknown);
        let lines = message
            .get("lines")
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_message)
            .map(Line::from_message)
            .collect::<Result<Vec<_>, _>>()?;
        let counts = message
            .get("counts")
            .and_then(Value::as_map)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.as_i32()?)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Order {
            order_id: message.get("order_id").and_then(Value::as_i64).unwrap_or_default(),
            customer,
            status,
            lines,
            counts,
            receipt: message.get("receipt").and_then(Value::as_bytes).unwrap_or_default().to_vec(),
            total: message.get("total").and_then(Value::as_f64).unwrap_or_default(),
            weight: message.get("weight").and_then(Value::as_f32).unwrap_or_default(),
            gift: message.get("gift").and_then(Value::as_bool).unwrap_or_default(),
            note: message.get("note").and_then(Value::as_str).map(str::to_string),
            priority: message.get("priority").and_then(Value::as_i32).unwrap_or_default(),
        })
    }
}

pub fn catalog() -> NativeCatalog {
    let mut catalog = NativeCatalog::new();
    catalog
        .register_message::<Order>()
        .and_then(|c| c.register_message::<Customer>())
        .and_then(|c| c.register_message::<Line>())
        .and_then(|c| c.register_enum::<Status>())
        .expect("shop catalog registers");
    catalog
}

pub fn registry() -> TypeRegistry {
    let class_path = ClassPath::new()
        .with_embedded("proto-message-types.properties", MESSAGE_BINDINGS)
        .with_embedded("proto-enum-types.properties", ENUM_BINDINGS);
    let config = RegistryConfig::default().with_class_path(class_path);
    TypeRegistry::load(&config, &catalog()).expect("shop registry loads")
}

/// An order with every field populated.
pub fn full_order() -> Order {
    Order {
        order_id: 9_007_199_254_740_993,
        customer: Some(Customer {
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }),
        status: Status::Paid,
        lines: vec![
            Line { sku: "A-1".to_string(), qty: 2 },
            Line { sku: "B-7".to_string(), qty: 1 },
        ],
        counts: vec![("a".to_string(), 1), ("b".to_string(), 2)],
        receipt: vec![0, 1, 2, 254, 255],
        total: 19.5,
        weight: 1.25,
        gift: true,
        note: Some(String::new()),
        priority: -3,
    }
}
