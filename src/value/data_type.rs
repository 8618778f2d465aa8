/// The ten data types of the value model (spec.md §3).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int,
    Float,
    GeoPoint,
    Text,
    BoolVector,
    IntVector,
    FloatVector,
    GeoPointVector,
    TextVector,
}

impl DataType {
    /// Whether values of this type support `<`/`<=`/`>`/`>=` ordering
    /// (used by binary-operator construction in the builder).
    pub fn is_orderable(self) -> bool {
        matches!(self, DataType::Int | DataType::Float | DataType::Text)
    }
}
