/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/queueup | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REMINDER_INTERVAL_SECS | 300 | 预约提醒扫描周期（秒） |
/// | TURN_INTERVAL_SECS | 120 | 叫号提醒扫描周期（秒） |
/// | REMINDER_WINDOW_MINS | 15 | 提醒提前量（分钟） |
/// | SMS_GATEWAY_URL | (未设置) | 短信网关地址，未设置则模拟发送 |
/// | SMS_FROM | (未设置) | 短信发送方号码 |
/// | LOG_DIR | (未设置) | 日志目录，未设置则只输出到终端 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/queueup HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 通知配置 ===
    /// 预约提醒扫描周期（秒）
    pub reminder_interval_secs: u64,
    /// 叫号提醒扫描周期（秒）
    pub turn_interval_secs: u64,
    /// 提醒提前量（分钟）
    pub reminder_window_mins: i64,
    /// 短信网关地址，未设置时短信只模拟发送
    pub sms_gateway_url: Option<String>,
    /// 短信发送方号码
    pub sms_from: Option<String>,

    /// 日志目录
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/queueup".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            reminder_interval_secs: std::env::var("REMINDER_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(300),
            turn_interval_secs: std::env::var("TURN_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(120),
            reminder_window_mins: std::env::var("REMINDER_WINDOW_MINS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15),
            sms_gateway_url: std::env::var("SMS_GATEWAY_URL").ok(),
            sms_from: std::env::var("SMS_FROM").ok(),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 默认值配置，不读环境变量
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            work_dir: ".".into(),
            http_port: 0,
            environment: "development".into(),
            reminder_interval_secs: 300,
            turn_interval_secs: 120,
            reminder_window_mins: 15,
            sms_gateway_url: None,
            sms_from: None,
            log_dir: None,
        }
    }

    /// 数据库存储目录
    pub fn database_dir(&self) -> String {
        format!("{}/database", self.work_dir)
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        if let Some(log_dir) = &self.log_dir {
            std::fs::create_dir_all(log_dir)?;
        }
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
