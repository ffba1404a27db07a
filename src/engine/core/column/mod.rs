pub mod column_serializer;
pub mod column_supplier;
pub mod compression;
pub mod encoders;
pub mod format;
pub mod metrics;
pub mod reader;

#[cfg(test)]
mod column_supplier_test;
