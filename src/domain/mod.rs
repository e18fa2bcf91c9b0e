//! Domain model

pub mod cart;
pub mod events;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartError, CartItem};
pub use events::{DomainEvent, OrderEvent, ProductEvent};
pub use order::{Order, OrderError, OrderItem, PaymentMethod, PaymentResult, ShippingAddress};
pub use product::{Product, ProductError, ProductUpdate, Review};
pub use user::{Role, User};
