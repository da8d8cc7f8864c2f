// ==========================================
// 安保服务管理系统 - 警情登记流程 E2E 测试
// ==========================================
// 流程: 表单快照 → 延迟自动派生 → 实体提取 → 落库 → 回读
// ==========================================


use gestionale_vigilanza::domain::form::{FieldValue, FormState, InMemoryFormState};
use gestionale_vigilanza::domain::intervention::form_fields::{
    DATA_REGISTRAZIONE, ORARIO_INTERVENTO, RITARDO, TEMPO_INTERVENTO,
};
use gestionale_vigilanza::domain::Intervento;
use gestionale_vigilanza::engine::AutoDelayEngine;
use gestionale_vigilanza::repository::{InterventionRepository, InterventionRepositoryImpl};

#[tokio::test]
async fn test_intervention_form_to_storage_roundtrip() {
    let (_temp_db, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let cliente_id = test_helpers::seed_cliente(&db_path, "Metalmeccanica Nord Srl").unwrap();
    let punto_servizio_id =
        test_helpers::seed_punto_servizio(&db_path, &cliente_id, "Magazzino A").unwrap();

    // 表单字段以 UI 文本形式到达
    let mut form = InMemoryFormState::new()
        .with_value(
            DATA_REGISTRAZIONE,
            FieldValue::Text("2024-07-10T08:00".to_string()),
        )
        .with_value(ORARIO_INTERVENTO, FieldValue::Text("08:30".to_string()))
        .with_value(TEMPO_INTERVENTO, FieldValue::Text("15".to_string()));

    // 监听字段变更后触发重算
    AutoDelayEngine.evaluate(&mut form);
    assert_eq!(form.get(RITARDO), Some(FieldValue::Number(15.0)));

    // 提取实体并落库
    let intervento =
        Intervento::from_form(&form, Some(cliente_id), Some(punto_servizio_id)).unwrap();
    let intervento_id = intervento.intervento_id.clone();

    let repo = InterventionRepositoryImpl::new(&db_path).unwrap();
    repo.insert_intervento(intervento).await.unwrap();

    // 回读验证
    let stored = repo.get_intervento(&intervento_id).await.unwrap().unwrap();
    assert_eq!(stored.cliente_id, Some(cliente_id));
    assert_eq!(stored.punto_servizio_id, Some(punto_servizio_id));
    assert_eq!(stored.orario_intervento.as_deref(), Some("08:30"));
    assert_eq!(stored.tempo_intervento_minuti, Some(15));
    assert_eq!(stored.ritardo_minuti, Some(15));

    let by_cliente = repo.list_by_cliente(&cliente_id).await.unwrap();
    assert_eq!(by_cliente.len(), 1);
    assert_eq!(repo.count_interventi().await.unwrap(), 1);
}

#[tokio::test]
async fn test_incomplete_form_cannot_be_stored() {
    let (_temp_db, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");

    // 登记时间缺失 → 引擎不派生,实体提取也拒绝
    let mut form = InMemoryFormState::new()
        .with_value(ORARIO_INTERVENTO, FieldValue::Text("08:30".to_string()))
        .with_value(TEMPO_INTERVENTO, FieldValue::Text("15".to_string()));

    AutoDelayEngine.evaluate(&mut form);
    assert_eq!(form.get(RITARDO), None);
    assert!(Intervento::from_form(&form, None, None).is_none());

    let repo = InterventionRepositoryImpl::new(&db_path).unwrap();
    assert_eq!(repo.count_interventi().await.unwrap(), 0);
}
