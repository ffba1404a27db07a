pub mod column_factory;
pub mod values_factory;

pub use column_factory::ColumnFactory;
pub use values_factory::ValuesFactory;

#[cfg(test)]
mod column_factory_test;
#[cfg(test)]
mod values_factory_test;
