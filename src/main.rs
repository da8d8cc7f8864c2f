// ==========================================
// 安保服务管理系统 - 命令行入口
// ==========================================
// 用途: 批量导入操作员表格文件
// 用法: gestionale-vigilanza <文件1> [文件2 ...]
// ==========================================

use gestionale_vigilanza::config::ConfigManager;
use gestionale_vigilanza::config::ImportConfigReader;
use gestionale_vigilanza::importer::{OperatorImporter, OperatorImporterImpl};
use gestionale_vigilanza::repository::OperatorImportRepositoryImpl;
use gestionale_vigilanza::{db, logging};
use std::path::Path;

#[tokio::main]
async fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", gestionale_vigilanza::APP_NAME);
    tracing::info!("系统版本: {}", gestionale_vigilanza::VERSION);
    tracing::info!("==================================================");

    let file_paths: Vec<String> = std::env::args().skip(1).collect();
    if file_paths.is_empty() {
        println!("用法: gestionale-vigilanza <文件1> [文件2 ...]");
        println!("支持格式: .xlsx / .xls / .csv");
        return;
    }

    // 获取数据库路径并初始化 schema
    let db_path = db::get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    if let Some(parent) = Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent).expect("无法创建数据目录");
    }

    let conn = db::open_sqlite_connection(&db_path).expect("无法打开数据库");
    db::init_schema(&conn).expect("无法初始化数据库 schema");
    drop(conn);

    // 装配导入器
    let repo = OperatorImportRepositoryImpl::new(&db_path).expect("无法初始化 Repository");
    let config = ConfigManager::new(&db_path).expect("无法初始化配置管理器");
    let min_telefono_digits = config
        .get_min_telefono_digits()
        .await
        .expect("无法读取配置");
    let importer = OperatorImporterImpl::with_default_components(repo, config, min_telefono_digits);

    // 批量导入
    let results = importer
        .batch_import(file_paths.clone())
        .await
        .expect("批量导入失败");

    for (file, result) in file_paths.iter().zip(results.iter()) {
        match result {
            Ok(import_result) => {
                println!(
                    "{}: 总计 {} 行, 成功 {}, 阻断 {}, 警告 {}, 冲突 {}",
                    file,
                    import_result.summary.total_rows,
                    import_result.summary.success,
                    import_result.summary.blocked,
                    import_result.summary.warning,
                    import_result.summary.conflict,
                );
            }
            Err(e) => {
                println!("{}: 导入失败 - {}", file, e);
            }
        }
    }
}
