// ==========================================
// ReportApi 集成测试
// ==========================================


use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use siglab_aviario::engine::RecordFilter;
use siglab_aviario::report::{ReportError, ReportResult, TextGenerator};
use test_helpers::*;

/// 记录收到的提示词，按配置返回固定结果
struct StubGenerator {
    prompts: Mutex<Vec<String>>,
    reply: Result<String, u16>,
}

impl StubGenerator {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            reply: Ok(text.to_string()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            prompts: Mutex::new(Vec::new()),
            reply: Err(status),
        })
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> ReportResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(429) => Err(ReportError::QuotaExceeded),
            Err(status) => Err(ReportError::HttpStatus {
                status: *status,
                message: "unavailable".to_string(),
            }),
        }
    }
}

fn seeded_env() -> ApiTestEnv {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.register_batch(4, "L-04", date(2024, 6, 1), 40);
    env.production_api
        .save_record(
            ProductionFormBuilder::new(4, date(2024, 6, 3))
                .mortality(2)
                .notes("calor intenso")
                .build(),
            None,
        )
        .expect("保存日产记录失败");
    env.production_api
        .save_record(ProductionFormBuilder::new(4, date(2024, 6, 4)).build(), None)
        .expect("保存日产记录失败");
    env
}

#[tokio::test]
async fn test_generate_report_提示词包含数据() {
    let env = seeded_env();
    let generator = StubGenerator::replying("**DESEMPENHO GERAL**: estável");
    let api = env.report_api(Some(generator.clone()));
    assert!(api.is_configured());

    let text = api
        .generate(&RecordFilter::default(), date(2024, 6, 30))
        .await
        .expect("报告生成失败");
    assert_eq!(text, "**DESEMPENHO GERAL**: estável");

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("RELATÓRIO EXPRESSO"));
    assert!(prompt.contains("calor intenso"));
    assert!(prompt.contains("Nenhuma observação registrada"));
    assert!(prompt.contains("\"postura\":\"85%\""));
    // 日期降序
    let newer = prompt.find("2024-06-04").unwrap();
    let older = prompt.find("2024-06-03").unwrap();
    assert!(newer < older);
}

#[tokio::test]
async fn test_generate_report_无数据() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let api = env.report_api(Some(StubGenerator::replying("ok")));

    let err = api
        .generate(&RecordFilter::default(), date(2024, 6, 30))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(err.to_string().contains("Não há dados registrados"));
}

#[tokio::test]
async fn test_generate_report_未配置() {
    let env = seeded_env();
    let api = env.report_api(None);
    assert!(!api.is_configured());

    let text = api
        .generate(&RecordFilter::default(), date(2024, 6, 30))
        .await
        .unwrap();
    assert!(text.contains("Configuração de API necessária"));
}

#[tokio::test]
async fn test_generate_report_调用失败() {
    let env = seeded_env();
    let generator = StubGenerator::failing(500);
    let api = env.report_api(Some(generator.clone()));

    let text = api
        .generate(&RecordFilter::default(), date(2024, 6, 30))
        .await
        .expect("失败时应返回提示文本");
    assert!(text.contains("erro ao processar o relatório"));
    assert_eq!(generator.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_generate_report_配额用尽() {
    let env = seeded_env();
    let api = env.report_api(Some(StubGenerator::failing(429)));

    let text = api
        .generate(&RecordFilter::default(), date(2024, 6, 30))
        .await
        .expect("配额用尽时应返回提示文本");
    assert!(text.contains("Limite de uso da API de IA"));
    assert!(!text.contains("erro ao processar o relatório"));
}
