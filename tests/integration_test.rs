use playground_automation::browser::ChromeSessions;
use playground_automation::config::Config;
use playground_automation::logger;
use playground_automation::{App, SessionFactory, TaskFlow, TaskKind, TaskStatus};

#[tokio::test]
#[ignore] // 默认忽略，需要本机 Chrome 和网络：cargo test -- --ignored
async fn test_full_run_against_playground() {
    logger::init();

    let report_file = std::env::temp_dir().join("playground_automation_report.json");
    let config = Config {
        headless: true,
        report_file: report_file.display().to_string(),
        ..Config::from_env()
    };

    let app = App::initialize(config).await.expect("启动浏览器失败");
    let report = app.run().await.expect("运行失败");

    assert_eq!(report.summary.total(), TaskKind::ALL.len());
    assert!(report_file.exists(), "报告文件应该已写入");
}

#[tokio::test]
#[ignore]
async fn test_single_task_in_fresh_session() {
    logger::init();

    let config = Config {
        headless: true,
        ..Config::from_env()
    };
    let sessions = ChromeSessions::start(&config).await.expect("启动浏览器失败");
    let page = sessions.open_session().await.expect("创建标签页失败");

    let outcome = TaskFlow::new(&config).execute(TaskKind::HiddenLayers, &page).await;
    assert_eq!(outcome.status, TaskStatus::Success, "{:?}", outcome.detail);

    sessions.close_session(page).await;
    sessions.shutdown().await;
}
