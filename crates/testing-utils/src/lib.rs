//! # Parsers Testing Utils
//!
//! 调度器各crate共用的测试工具：
//!
//! - **Mock Repositories**: 注册表和运行历史的内存实现
//! - **Mock Ports**: 容器状态查询、进程启动和固定时钟
//! - **Test Data Builders**: `JobRecordBuilder`
//!
//! ```toml
//! [dev-dependencies]
//! parsers-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
