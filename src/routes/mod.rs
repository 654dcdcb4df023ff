// 路由模块
// fetch 为站点请求兜底入口，worker 为页面与网关的控制通道

pub mod fetch;
pub mod worker;
