pub mod column;

pub use column::column_serializer::{ColumnarIntsSerializer, SerializerOptions};
pub use column::column_supplier::ColumnarIntsSupplier;
pub use column::reader::ColumnarInts;
