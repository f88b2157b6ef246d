//! 行情轮询任务
//!
//! 随服务启动的后台循环：每个周期拉取一次期货快照，
//! 渲染为一行键值对文本追加到当天（北京时间）的日内文件。
//! 拉取失败只记录日志跳过本次，不重试

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Asia::Shanghai;

use crate::services::paths::DataPaths;
use crate::services::sina;

/// 启动轮询任务
pub fn spawn(paths: DataPaths, interval_secs: u64) {
    let interval = Duration::from_secs(interval_secs.max(1));
    actix_web::rt::spawn(async move {
        log::info!("行情轮询任务启动，间隔 {} 秒", interval.as_secs());
        loop {
            tokio::time::sleep(interval).await;
            poll_once(&paths).await;
        }
    });
}

/// 执行一次拉取与落盘
async fn poll_once(paths: &DataPaths) {
    let quote = match sina::get_futures().await {
        Ok(quote) => quote,
        Err(e) => {
            log::warn!("拉取期货行情失败，跳过本次写入: {}", e);
            return;
        }
    };

    let line = sina::format_day_line(&quote);
    let date = Utc::now()
        .with_timezone(&Shanghai)
        .format("%Y-%m-%d")
        .to_string();
    let path = paths.futures_for_date(&date);
    match append_line(paths, &path, &line) {
        Ok(()) => log::info!("写入期货数据: {}", line.trim_end()),
        Err(e) => log::error!("写入期货日内文件 {} 失败: {}", path.display(), e),
    }
}

/// 追加一行到日内文件，目录与文件不存在时创建
fn append_line(paths: &DataPaths, path: &Path, line: &str) -> std::io::Result<()> {
    fs::create_dir_all(paths.futures_dir())?;
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_line_creates_and_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path());
        let path = paths.futures_for_date("2025-01-02");

        append_line(&paths, &path, "现价:1\n").unwrap();
        append_line(&paths, &path, "现价:2\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "现价:1\n现价:2\n");
    }
}
