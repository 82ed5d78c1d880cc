use std::{fmt, ops::Index, slice, sync::Arc};

/// Type of a column, as declared in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Ascii,
    BigInt,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Timestamp,
    Uuid,
    Text,
    Varint,
    Timeuuid,
    Inet,
    Date,
    Time,
    SmallInt,
    TinyInt,
    Duration,
    /// Server-side type identified by its fully qualified class name.
    Custom(String),
    List(Box<DataType>),
    Set(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Udt {
        keyspace: String,
        name: String,
        fields: Vec<(String, DataType)>,
    },
    Tuple(Vec<DataType>),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Ascii => write!(f, "ascii"),
            DataType::BigInt => write!(f, "bigint"),
            DataType::Blob => write!(f, "blob"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Counter => write!(f, "counter"),
            DataType::Decimal => write!(f, "decimal"),
            DataType::Double => write!(f, "double"),
            DataType::Float => write!(f, "float"),
            DataType::Int => write!(f, "int"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::Uuid => write!(f, "uuid"),
            DataType::Text => write!(f, "text"),
            DataType::Varint => write!(f, "varint"),
            DataType::Timeuuid => write!(f, "timeuuid"),
            DataType::Inet => write!(f, "inet"),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::SmallInt => write!(f, "smallint"),
            DataType::TinyInt => write!(f, "tinyint"),
            DataType::Duration => write!(f, "duration"),
            DataType::Custom(class) => write!(f, "'{class}'"),
            DataType::List(element) => write!(f, "list<{element}>"),
            DataType::Set(element) => write!(f, "set<{element}>"),
            DataType::Map(key, value) => write!(f, "map<{key}, {value}>"),
            DataType::Udt { keyspace, name, .. } => write!(f, "{keyspace}.{name}"),
            DataType::Tuple(elements) => {
                write!(f, "tuple<")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ">")
            }
        }
    }
}

/// A single column of a result or of a prepared statement's bind markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDefinition {
    pub keyspace: String,
    pub table: String,
    pub name: String,
    pub data_type: DataType,
}

/// Ordered column metadata.
///
/// Row payloads are positional, so the order here is the order of the values in every
/// row. Cloning is cheap; the definitions are shared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnDefinitions(Arc<[ColumnDefinition]>);

impl ColumnDefinitions {
    pub fn new(definitions: Vec<ColumnDefinition>) -> Self {
        Self(definitions.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDefinition> {
        self.0.get(index)
    }

    /// Position of the first column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|c| c.name == name)
    }

    pub fn iter(&self) -> slice::Iter<'_, ColumnDefinition> {
        self.0.iter()
    }
}

impl Index<usize> for ColumnDefinitions {
    type Output = ColumnDefinition;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a ColumnDefinitions {
    type Item = &'a ColumnDefinition;
    type IntoIter = slice::Iter<'a, ColumnDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
