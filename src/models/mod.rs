//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod product;
pub mod vote;
pub mod comment;
pub mod boost;
pub mod admin;

// Re-export commonly used models
pub use user::{
    User, PublicUser, Role, CreateUserRequest, UpdateUserRequest, RegisterRequest, LoginRequest, UserProfile,
    PointTransaction, PointsHistory,
};
pub use product::{
    Product, ProductView, ProductStatus, CreateProductRequest, UpdateProductRequest, NewProduct, ProductSort,
    ProductQuery, ProductPage,
};
pub use vote::VoteOutcome;
pub use comment::{Comment, CommentView, CommentStatus, CreateCommentRequest};
pub use boost::{
    BoostPlan, BoostPurchase, BoostReceipt, PurchaseBoostRequest, BoostSalesMonth, PlanSales, TopBoostedProduct,
    SalesTotals, SalesReport,
};
pub use admin::{
    PlatformStats, UserPage, RejectProductRequest, SetRoleRequest, AdjustPointsRequest, ModerationQuery, UserListQuery,
    SalesQuery,
};
