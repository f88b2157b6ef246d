//! 数据目录布局
//!
//! 所有业务数据均为数据根目录下的平面文件，按日期命名；
//! 写入策略为整文件覆盖或追加，后写者胜，无锁

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 数据根目录及各类文件的路径推导
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// 确保数据子目录存在（positions / futures / chats / newssort）
    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [
            self.positions_dir(),
            self.futures_dir(),
            self.chats_dir(),
            self.news_sort_dir(),
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn positions_dir(&self) -> PathBuf {
        self.root.join("positions")
    }

    pub fn futures_dir(&self) -> PathBuf {
        self.root.join("futures")
    }

    pub fn chats_dir(&self) -> PathBuf {
        self.root.join("chats")
    }

    pub fn news_sort_dir(&self) -> PathBuf {
        self.root.join("newssort")
    }

    /// 全局资产快照文件
    pub fn assets(&self) -> PathBuf {
        self.positions_dir().join("assets.json")
    }

    /// 指定日期的期货日内数据文件
    pub fn futures_for_date(&self, date: &str) -> PathBuf {
        self.futures_dir().join(format!("{}.txt", sanitize_date(date)))
    }

    /// 指定日期的对话记录文件
    pub fn chat_for_date(&self, date: &str) -> PathBuf {
        self.chats_dir().join(format!("{}.json", sanitize_date(date)))
    }

    /// 指定日期的快讯游标文件
    pub fn news_sort_for_date(&self, date: &str) -> PathBuf {
        self.news_sort_dir().join(format!("{}.txt", sanitize_date(date)))
    }

    /// 全局快讯游标文件（存在时优先于当日文件）
    pub fn news_sort_global(&self) -> PathBuf {
        self.news_sort_dir().join("sort")
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new("data")
    }
}

/// 日期串清洗：仅保留数字与连字符，防止路径穿越
fn sanitize_date(date: &str) -> String {
    date.chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect()
}

/// 列出目录下指定扩展名的文件，去掉扩展名后排序返回
///
/// 目录不存在或不可读时返回空列表
pub fn list_dated_files(dir: &Path, ext: &str) -> Vec<String> {
    let mut dates: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter_map(|name| name.strip_suffix(ext).map(str::to_string))
            .collect(),
        Err(_) => Vec::new(),
    };
    dates.sort();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_date() {
        assert_eq!(sanitize_date("2025-01-02"), "2025-01-02");
        assert_eq!(sanitize_date("../etc/passwd"), "--");
        assert_eq!(sanitize_date("2025-01-02/../x"), "2025-01-02--");
    }

    #[test]
    fn test_path_layout() {
        let paths = DataPaths::new("/tmp/advisor");
        assert_eq!(
            paths.futures_for_date("2025-01-02"),
            PathBuf::from("/tmp/advisor/futures/2025-01-02.txt")
        );
        assert_eq!(
            paths.chat_for_date("2025-01-02"),
            PathBuf::from("/tmp/advisor/chats/2025-01-02.json")
        );
        assert_eq!(
            paths.assets(),
            PathBuf::from("/tmp/advisor/positions/assets.json")
        );
        assert_eq!(
            paths.news_sort_global(),
            PathBuf::from("/tmp/advisor/newssort/sort")
        );
    }

    #[test]
    fn test_list_dated_files() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path());
        paths.ensure_dirs().unwrap();
        std::fs::write(paths.futures_for_date("2025-01-03"), "x").unwrap();
        std::fs::write(paths.futures_for_date("2025-01-01"), "x").unwrap();
        std::fs::write(paths.futures_dir().join("notes.json"), "x").unwrap();

        let dates = list_dated_files(&paths.futures_dir(), ".txt");
        assert_eq!(dates, vec!["2025-01-01", "2025-01-03"]);
        // 目录不存在时返回空
        assert!(list_dated_files(&tmp.path().join("missing"), ".txt").is_empty());
    }

    #[test]
    fn test_ensure_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(tmp.path().join("data"));
        paths.ensure_dirs().unwrap();
        assert!(paths.futures_dir().is_dir());
        assert!(paths.chats_dir().is_dir());
        assert!(paths.positions_dir().is_dir());
        assert!(paths.news_sort_dir().is_dir());
    }
}
