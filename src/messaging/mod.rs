// 消息与通知侧信道
// 页面连通性探测应答、在线状态广播、推送通知解析与点击分发

pub mod clients;
pub mod model;

pub use clients::{ClickOutcome, ClientRegistry};
pub use model::{ConnectivityStatus, Notification, PageMessage, WorkerMessage};
