//! Catalog entities: the category tree, per-category attribute schema,
//! products and their stored attribute values.
pub mod attribute_option;
pub mod category;
pub mod category_attribute;
pub mod product;
pub mod product_attribute_value;

pub use attribute_option::{Entity as AttributeOption, Model as AttributeOptionModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use category_attribute::{
    AttrDataType, Entity as CategoryAttribute, Model as CategoryAttributeModel,
};
pub use product::{Entity as Product, Model as ProductModel, ProductStatus};
pub use product_attribute_value::{
    Entity as ProductAttributeValue, Model as ProductAttributeValueModel,
};
