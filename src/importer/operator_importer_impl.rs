// ==========================================
// 安保服务管理系统 - 操作员数据导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 映射 → 清洗 → DQ 校验 → 客户引用校验 → 冲突检测 → 落库
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::operator::{
    ConflictType, DqLevel, DqViolation, ImportBatch, ImportConflict, Operatore, OperatorRecord,
};
use crate::importer::error::ImportError;
use crate::importer::operator_importer_trait::{
    ConflictHandler, DataCleaner, DqValidator, FieldMapper, FileParser, OperatorImporter,
};
use crate::repository::OperatorImportRepository;
use chrono::Utc;
use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// OperatorImporterImpl - 操作员数据导入器实现
// ==========================================
pub struct OperatorImporterImpl<R, C>
where
    R: OperatorImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    data_cleaner: Box<dyn DataCleaner>,
    dq_validator: Box<dyn DqValidator>,
    conflict_handler: Box<dyn ConflictHandler>,
}

impl<R, C> OperatorImporterImpl<R, C>
where
    R: OperatorImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的 OperatorImporter 实例
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - data_cleaner: 数据清洗器
    /// - dq_validator: DQ 校验器
    /// - conflict_handler: 冲突处理器
    pub fn new(
        import_repo: R,
        config: C,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        data_cleaner: Box<dyn DataCleaner>,
        dq_validator: Box<dyn DqValidator>,
        conflict_handler: Box<dyn ConflictHandler>,
    ) -> Self {
        Self {
            import_repo,
            config,
            file_parser,
            field_mapper,
            data_cleaner,
            dq_validator,
            conflict_handler,
        }
    }

    /// 使用默认组件装配导入器
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - config: 配置读取器
    /// - min_telefono_digits: DQ 电话位数阈值
    pub fn with_default_components(
        import_repo: R,
        config: C,
        min_telefono_digits: usize,
    ) -> Self {
        Self::new(
            import_repo,
            config,
            Box::new(crate::importer::file_parser::UniversalFileParser),
            Box::new(crate::importer::field_mapper::FieldMapper),
            Box::new(crate::importer::data_cleaner::DataCleaner),
            Box::new(crate::importer::dq_validator::DqValidator::new(
                min_telefono_digits,
            )),
            Box::new(crate::importer::conflict_handler::ConflictHandler),
        )
    }
}

#[async_trait::async_trait]
impl<R, C> OperatorImporter for OperatorImporterImpl<R, C>
where
    R: OperatorImportRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    /// 从表格文件导入操作员数据
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<crate::domain::operator::ImportResult, Box<dyn Error>> {
        use std::time::Instant;
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();

        let file_path_str = file_path.as_ref().to_str().unwrap_or("unknown");
        info!(batch_id = %batch_id, file_path = %file_path_str, "开始导入操作员数据");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let raw_rows = self
            .file_parser
            .parse_to_raw_rows(file_path.as_ref())
            .map_err(|e| {
                error!(error = %e, "文件解析失败");
                format!("文件解析失败: {}", e)
            })?;

        let total_rows = raw_rows.len();
        info!(total_rows = total_rows, "文件解析完成");

        // 行数上限检查
        let max_rows = self.config.get_max_import_rows().await?;
        if total_rows > max_rows {
            return Err(Box::new(ImportError::TooManyRows {
                actual: total_rows,
                max: max_rows,
            }));
        }

        // === 步骤 2: 字段映射（必填校验在此硬失败）===
        debug!("步骤 2: 字段映射");
        let mut records = Vec::new();
        let mut mapping_errors = Vec::new();
        for (idx, row) in raw_rows.into_iter().enumerate() {
            let row_number = idx + 1;
            // 映射失败时仍需原始行内容进冲突队列
            let raw_data =
                serde_json::to_string(&row).unwrap_or_else(|_| "{}".to_string());

            match self.field_mapper.map_to_operator(row, row_number) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // 映射失败：记录错误信息（转换为字符串以避免 Send 问题）
                    warn!(row_number = row_number, error = %e, "字段映射失败");
                    mapping_errors.push((row_number, format!("{}", e), raw_data));
                }
            }
        }
        info!(
            success = records.len(),
            failed = mapping_errors.len(),
            "字段映射完成"
        );

        // 硬失败行写入冲突队列 + Error 级违规
        let mut all_violations: Vec<DqViolation> = Vec::new();
        let mut conflicts: Vec<ImportConflict> = Vec::new();
        for (row_number, reason, raw_data) in &mapping_errors {
            all_violations.push(DqViolation {
                row_number: *row_number,
                operator_label: None,
                level: DqLevel::Error,
                field: "nome,cognome".to_string(),
                message: reason.clone(),
            });
            conflicts.push(ImportConflict {
                conflict_id: Uuid::new_v4().to_string(),
                batch_id: batch_id.clone(),
                row_number: *row_number,
                operator_label: None,
                conflict_type: ConflictType::RequiredFieldMissing,
                raw_data: raw_data.clone(),
                reason: reason.clone(),
                resolved: false,
                created_at: Utc::now(),
            });
        }

        // === 步骤 3: 数据清洗 ===
        debug!("步骤 3: 数据清洗");
        for record in &mut records {
            self.clean_record(record);
        }
        debug!("数据清洗完成");

        // === 步骤 4: DQ 校验（不拒绝行）===
        debug!("步骤 4: DQ 校验");
        for record in &records {
            all_violations.extend(self.dq_validator.validate_contacts(record));
        }

        // === 步骤 5: 客户引用校验 ===
        debug!("步骤 5: 客户引用校验");
        let known_clients = self.import_repo.list_cliente_ids().await?;
        all_violations.extend(
            self.dq_validator
                .validate_client_refs(&records, &known_clients),
        );

        // 未知客户引用按配置降级为 None（保持"合法 UUID 或 None"不变式 + 外键约束）
        if self.config.get_null_unknown_client_refs().await? {
            let known_set: HashSet<Uuid> = known_clients.iter().copied().collect();
            for record in &mut records {
                if let Some(cliente_id) = record.cliente_id {
                    if !known_set.contains(&cliente_id) {
                        warn!(
                            row_number = record.row_number,
                            cliente_id = %cliente_id,
                            "客户引用不存在,降级为 None"
                        );
                        record.cliente_id = None;
                    }
                }
            }
        }
        info!(violations = all_violations.len(), "DQ 校验完成");

        // === 步骤 6: 冲突检测 ===
        debug!("步骤 6: 冲突检测");
        let (valid_records, duplicate_conflicts) =
            self.detect_conflicts(&batch_id, records).await?;
        conflicts.extend(duplicate_conflicts);

        let conflict_count = conflicts
            .iter()
            .filter(|c| c.conflict_type == ConflictType::DuplicateOperator)
            .count();
        info!(
            valid = valid_records.len(),
            conflicts = conflict_count,
            "冲突检测完成"
        );

        if !conflicts.is_empty() {
            self.import_repo.batch_insert_conflicts(conflicts).await?;
        }

        // === 步骤 7: 转换为 Operatore 并落库 ===
        debug!("步骤 7: 落库");
        let operatori = self.convert_to_operatori(&batch_id, valid_records);
        let success_count = self.import_repo.batch_insert_operatori(operatori).await?;
        info!(count = success_count, "Operatore 插入完成");

        // === 步骤 8: 记录批次信息 + 构造返回结果 ===
        let warning_rows = all_violations
            .iter()
            .filter(|v| matches!(v.level, DqLevel::Warning))
            .count();
        let blocked_rows = mapping_errors.len();

        let mut dq_report = self
            .dq_validator
            .generate_dq_report(batch_id.clone(), all_violations.clone());
        dq_report.summary.total_rows = total_rows;
        dq_report.summary.success = success_count;
        dq_report.summary.conflict = conflict_count;

        let import_completed_at = Utc::now();
        let elapsed_time = start_time.elapsed();

        let batch = ImportBatch {
            batch_id: batch_id.clone(),
            file_name: Some(
                Path::new(file_path_str)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            ),
            file_path: Some(file_path_str.to_string()),
            total_rows: total_rows as i32,
            success_rows: success_count as i32,
            blocked_rows: blocked_rows as i32,
            warning_rows: warning_rows as i32,
            conflict_rows: conflict_count as i32,
            imported_at: Some(import_completed_at),
            imported_by: Some("system".to_string()),
            elapsed_ms: Some(elapsed_time.as_millis() as i32),
            dq_report_json: Some(serde_json::to_string(&dq_report)?),
        };

        self.import_repo.insert_batch(batch.clone()).await?;

        let summary = crate::domain::operator::DqSummary {
            total_rows,
            success: success_count,
            blocked: blocked_rows,
            warning: warning_rows,
            conflict: conflict_count,
        };

        info!(
            batch_id = %batch_id,
            total = total_rows,
            success = success_count,
            blocked = blocked_rows,
            conflicts = conflict_count,
            elapsed_ms = elapsed_time.as_millis(),
            "操作员数据导入完成"
        );

        Ok(crate::domain::operator::ImportResult {
            batch,
            summary,
            violations: all_violations,
            elapsed_time,
        })
    }

    /// 从 CSV 文件导入操作员数据
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> Result<crate::domain::operator::ImportResult, Box<dyn Error>> {
        // CSV 导入复用通用导入逻辑
        self.import_from_file(file_path).await
    }

    /// 批量导入多个文件（并发执行）
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Result<Vec<Result<crate::domain::operator::ImportResult, String>>, Box<dyn Error>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        // 为每个文件创建导入任务
        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().to_str().unwrap_or("unknown").to_string();
            async move {
                info!(file = %path_str, "开始导入文件");
                match self.import_from_file(path).await {
                    Ok(result) => {
                        info!(
                            file = %path_str,
                            success = result.summary.success,
                            "文件导入成功"
                        );
                        Ok(result)
                    }
                    Err(e) => {
                        error!(file = %path_str, error = %e, "文件导入失败");
                        Err(format!("文件 {} 导入失败: {}", path_str, e))
                    }
                }
            }
        });

        // 并发执行所有导入任务
        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        Ok(results)
    }
}

// 辅助方法
impl<R, C> OperatorImporterImpl<R, C>
where
    R: OperatorImportRepository,
    C: ImportConfigReader,
{
    /// 清洗单条记录（联系方式规范化）
    fn clean_record(&self, record: &mut OperatorRecord) {
        record.telefono = self.data_cleaner.clean_telefono(record.telefono.take());
        record.email = self.data_cleaner.clean_email(record.email.take());
        record.note = self.data_cleaner.normalize_null(record.note.take());
    }

    /// 冲突检测（同批次内 + 跨批次），返回有效记录与冲突列表
    async fn detect_conflicts(
        &self,
        batch_id: &str,
        records: Vec<OperatorRecord>,
    ) -> Result<(Vec<OperatorRecord>, Vec<ImportConflict>), Box<dyn Error>> {
        // 步骤 1: 检测同批次内重复
        let intra_batch_duplicates = self.conflict_handler.detect_duplicates(&records);

        // 步骤 2: 检测跨批次重复
        let dedup_keys: Vec<String> = records.iter().map(|r| r.dedup_key()).collect();
        let existing_keys = self.import_repo.batch_check_exists(dedup_keys).await?;
        let cross_batch_duplicates = self
            .conflict_handler
            .detect_cross_batch_duplicates(&records, &existing_keys);

        // 步骤 3: 合并冲突行号
        let mut conflict_rows = HashSet::new();
        for (row_number, _) in intra_batch_duplicates
            .iter()
            .chain(cross_batch_duplicates.iter())
        {
            conflict_rows.insert(*row_number);
        }

        // 步骤 4: 构造冲突记录
        let mut conflicts = Vec::new();
        let mut push_conflict = |row_number: usize, label: &str, reason: String| {
            let raw_record = records.iter().find(|r| r.row_number == row_number);
            let raw_data = raw_record
                .and_then(|r| serde_json::to_string(r).ok())
                .unwrap_or_else(|| "{}".to_string());

            conflicts.push(ImportConflict {
                conflict_id: Uuid::new_v4().to_string(),
                batch_id: batch_id.to_string(),
                row_number,
                operator_label: Some(label.to_string()),
                conflict_type: ConflictType::DuplicateOperator,
                raw_data,
                reason,
                resolved: false,
                created_at: Utc::now(),
            });
        };

        for (row_number, label) in &intra_batch_duplicates {
            push_conflict(*row_number, label, format!("同批次内重复操作员: {}", label));
        }
        for (row_number, label) in &cross_batch_duplicates {
            push_conflict(*row_number, label, format!("跨批次重复操作员: {}", label));
        }

        // 步骤 5: 过滤出有效记录
        let valid_records: Vec<OperatorRecord> = records
            .into_iter()
            .filter(|r| !conflict_rows.contains(&r.row_number))
            .collect();

        Ok((valid_records, conflicts))
    }

    /// 转换为 Operatore 落库实体
    fn convert_to_operatori(
        &self,
        batch_id: &str,
        records: Vec<OperatorRecord>,
    ) -> Vec<Operatore> {
        let now = Utc::now();
        records
            .into_iter()
            .map(|record| Operatore {
                operatore_id: Uuid::new_v4().to_string(),
                nome: record.nome,
                cognome: record.cognome,
                cliente_id: record.cliente_id,
                telefono: record.telefono,
                email: record.email,
                note: record.note,
                import_batch_id: Some(batch_id.to_string()),
                created_at: now,
                updated_at: now,
            })
            .collect()
    }
}
