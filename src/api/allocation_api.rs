// ==========================================
// 教室容量分配系统 - 分配会话 API
// ==========================================
// 职责: 持有权威目录，串联分析/分配/人工修改/场次切换/导入
// 红线: 命令要么完整生效要么不生效（先在副本上执行，落库成功后再替换）
// 约定: 单线程调用，所有修改命令取 &mut self
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::room_view::RoomView;
use crate::config::{ConfigManager, EngineConfig};
use crate::db;
use crate::domain::allocation::{
    AllocationOutcome, AllocationRequest, AllocationStrategy, OutcomeKind,
};
use crate::domain::catalog::{CategoryFilter, RoomCatalog};
use crate::domain::history::HistoryEntry;
use crate::domain::room::{CapacityConstraint, Room};
use crate::domain::types::{AnalyzeMode, RoomId};
use crate::engine::allocator::AllocationEngine;
use crate::engine::capacity_analyzer::{CapacityAnalyzer, HighlightSet};
use crate::engine::events::{AllocationEvent, AllocationEventPublisher};
use crate::engine::history_log::HistoryLog;
use crate::engine::manual_override::ManualOverride;
use crate::engine::risk::RiskClassifier;
use crate::engine::seeding::{reseed_catalog, OccupancySeeder, RandomSeeder};
use crate::i18n::t_with_args;
use crate::importer::CatalogImporter;
use crate::repository::{HistoryRepository, RoomRepository};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// DTO
// ==========================================

/// 指定教室分配后未能放下的人数（手动拆分流程）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRemainder {
    pub source_room_id: RoomId,
    pub remaining: u32,
}

/// 命令执行结果（新状态 + 分配结果 + 提示消息）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    pub rooms: Vec<RoomView>,
    pub outcome: Option<AllocationOutcome>,
    pub message: String,
}

struct SessionStore {
    rooms: Arc<RoomRepository>,
    history: Arc<HistoryRepository>,
}

// ==========================================
// AllocationApi - 分配会话
// ==========================================

/// 分配会话API
///
/// 职责：
/// 1. 可用性分析（高亮集合）
/// 2. 三种策略分配 + “添加到此处” + 剩余人数改派
/// 3. 人工修改人数
/// 4. 场次切换（整体重新播种）
/// 5. 目录导入、展示视图、历史
pub struct AllocationApi {
    catalog: RoomCatalog,
    config: EngineConfig,
    classifier: RiskClassifier,
    analyzer: CapacityAnalyzer,
    engine: AllocationEngine,
    manual_override: ManualOverride,
    history: HistoryLog,
    seeder: Box<dyn OccupancySeeder>,
    session_idx: usize,
    highlights: HighlightSet,
    pending: Option<PendingRemainder>,
    store: Option<SessionStore>,
}

impl AllocationApi {
    /// 创建内存会话（不落库）
    pub fn new(catalog: RoomCatalog, config: EngineConfig) -> Self {
        let manual_override = if config.anomaly_test_mode {
            ManualOverride::with_anomaly_test_mode()
        } else {
            ManualOverride::new()
        };

        let mut history = HistoryLog::new();
        if let Some(session) = config.sessions.first() {
            history.set_session(session.clone());
        }

        Self {
            catalog,
            classifier: RiskClassifier::new(config.risk),
            analyzer: CapacityAnalyzer::new(),
            engine: AllocationEngine::new(),
            manual_override,
            history,
            seeder: Box::new(RandomSeeder::new(config.seeding.max_ratio)),
            session_idx: 0,
            highlights: HighlightSet::default(),
            pending: None,
            store: None,
            config,
        }
    }

    /// 打开数据库文件并加载会话
    ///
    /// 空库时写入默认目录并随机播种
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = db::open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 打开数据库文件，使用指定播种器（首次播种与场次切换）
    pub fn open_with_seeder(db_path: &str, seeder: Box<dyn OccupancySeeder>) -> ApiResult<Self> {
        let conn = db::open_sqlite_connection(db_path)?;
        Self::from_connection_with_seeder(Arc::new(Mutex::new(conn)), seeder)
    }

    /// 从已有连接加载会话（配置、目录、场次均从库中读取）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        Self::load(conn, None)
    }

    pub fn from_connection_with_seeder(
        conn: Arc<Mutex<Connection>>,
        seeder: Box<dyn OccupancySeeder>,
    ) -> ApiResult<Self> {
        Self::load(conn, Some(seeder))
    }

    fn load(
        conn: Arc<Mutex<Connection>>,
        seeder: Option<Box<dyn OccupancySeeder>>,
    ) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseError(format!("数据库锁获取失败: {}", e)))?;
            db::init_schema(&guard)?;
        }

        let config = ConfigManager::from_connection(conn.clone()).load_engine_config()?;
        let rooms = Arc::new(RoomRepository::new(conn.clone()));
        let history = Arc::new(HistoryRepository::new(conn));

        let mut api = Self::new(RoomCatalog::default_catalog(), config);
        if let Some(seeder) = seeder {
            api.seeder = seeder;
        }

        // 空库: 默认目录 + 首个场次播种
        if rooms.count()? == 0 {
            let mut catalog = RoomCatalog::default_catalog();
            let total = reseed_catalog(&mut catalog, api.seeder.as_mut())?;
            rooms.replace_catalog_for_session(&catalog, 0)?;
            info!(total_occupancy = total, "空库，写入默认教室目录并播种");
        }

        api.catalog = rooms.load_catalog()?;
        let session_count = api.config.sessions.len().max(1);
        api.session_idx = rooms.load_session_index()?.unwrap_or(0) % session_count;
        let session = api.current_session().to_string();
        api.history.set_session(session.clone());
        info!(rooms = api.catalog.len(), session = %session, "教室目录加载完成");

        Ok(api.with_store(rooms, history))
    }

    /// 替换播种器（测试用固定值播种）
    pub fn with_seeder(mut self, seeder: Box<dyn OccupancySeeder>) -> Self {
        self.seeder = seeder;
        self
    }

    /// 挂接持久化仓储
    pub fn with_store(
        mut self,
        rooms: Arc<RoomRepository>,
        history: Arc<HistoryRepository>,
    ) -> Self {
        self.store = Some(SessionStore { rooms, history });
        self
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    pub fn pending(&self) -> Option<PendingRemainder> {
        self.pending
    }

    /// 当前场次名称
    pub fn current_session(&self) -> &str {
        self.config
            .sessions
            .get(self.session_idx)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// 会话内历史（最新在前）
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.entries()
    }

    /// 已落库的历史（最新在前）；未挂接仓储时返回会话内历史
    pub fn persisted_history(&self, limit: usize) -> ApiResult<Vec<HistoryEntry>> {
        match &self.store {
            Some(store) => Ok(store.history.list_recent(limit)?),
            None => Ok(self.history.entries().take(limit).cloned().collect()),
        }
    }

    /// 按类别筛选的展示视图
    pub fn room_views(&self, filter: CategoryFilter) -> ApiResult<Vec<RoomView>> {
        self.catalog
            .filter(filter)
            .into_iter()
            .map(|room| {
                RoomView::project(room, &self.classifier, &self.highlights).map_err(ApiError::from)
            })
            .collect()
    }

    /// 容量异常教室
    pub fn capacity_anomalies(&self) -> Vec<RoomId> {
        self.catalog.capacity_anomalies()
    }

    // ==========================================
    // 可用性分析
    // ==========================================

    /// 分析可用教室并保存高亮集合
    ///
    /// # 错误
    /// - `InvalidRequest`: 输入非正整数，高亮集合被清空
    #[instrument(skip(self))]
    pub fn analyze(&mut self, input: &str, mode: AnalyzeMode) -> ApiResult<CommandResult> {
        let request = match AllocationRequest::parse(input) {
            Ok(request) => request,
            Err(e) => {
                self.highlights = HighlightSet::default();
                warn!(input, "分析请求无效");
                return Err(e.into());
            }
        };

        let highlights = self.analyzer.analyze(self.catalog.rooms(), &request, mode);
        let requested = request.requested_count().to_string();
        let message = if !highlights.is_empty() {
            let count = highlights.len().to_string();
            let mode = mode.to_string();
            t_with_args(
                "analyze.found",
                &[
                    ("count", count.as_str()),
                    ("requested", requested.as_str()),
                    ("mode", mode.as_str()),
                ],
            )
        } else {
            let free = self.analyzer.free_capacity(self.catalog.rooms());
            if free > 0 {
                let free = free.to_string();
                t_with_args(
                    "analyze.no_single_room",
                    &[("requested", requested.as_str()), ("free", free.as_str())],
                )
            } else {
                t_with_args("analyze.no_space", &[("requested", requested.as_str())])
            }
        };

        info!(matched = highlights.len(), "可用性分析完成");
        self.highlights = highlights;
        self.command_result(None, message)
    }

    /// 按策略对应的分析模式分析
    pub fn analyze_for(
        &mut self,
        input: &str,
        strategy: AllocationStrategy,
    ) -> ApiResult<CommandResult> {
        self.analyze(input, strategy.analyze_mode())
    }

    // ==========================================
    // 分配
    // ==========================================

    /// 按指定策略分配
    ///
    /// # 错误
    /// - `InvalidRequest` / `RoomNotFound` / `AllocationExhausted`: 状态不变
    #[instrument(skip(self), fields(strategy = %strategy))]
    pub fn allocate(&mut self, input: &str, strategy: AllocationStrategy) -> ApiResult<CommandResult> {
        let request = AllocationRequest::parse(input).map_err(|e| {
            warn!(input, "分配请求无效");
            ApiError::from(e)
        })?;
        self.execute_allocation(&request, strategy)
    }

    /// 使用配置的默认策略分配
    pub fn allocate_default(&mut self, input: &str) -> ApiResult<CommandResult> {
        let strategy = self.config.default_strategy.to_strategy();
        self.allocate(input, strategy)
    }

    /// “添加到此处”: 以最近一次分析的人数对标出的教室执行分配
    ///
    /// ExactFit 分析 -> 指定教室分配; AnySpace 分析 -> 从该教室开始瀑布分配
    ///
    /// # 错误
    /// - `RoomNotHighlighted`: 教室不在当前高亮集合中
    pub fn add_here(&mut self, room_id: RoomId) -> ApiResult<CommandResult> {
        let requested = match self.highlights.requested() {
            Some(requested) if self.highlights.contains(room_id) => requested,
            _ => return Err(ApiError::RoomNotHighlighted { room_id }),
        };

        let strategy = match self.highlights.mode() {
            Some(AnalyzeMode::AnySpace) => AllocationStrategy::Waterfall {
                start: Some(room_id),
            },
            Some(AnalyzeMode::ExactFit) | None => AllocationStrategy::Direct { room_id },
        };
        let request = AllocationRequest::new(i64::from(requested))?;
        self.execute_allocation(&request, strategy)
    }

    /// 将指定教室分配剩余的人数改派到另一间教室
    ///
    /// # 错误
    /// - `NoPendingRemainder`: 没有待分配人数
    pub fn retarget_pending(&mut self, room_id: RoomId) -> ApiResult<CommandResult> {
        let pending = self.pending.ok_or(ApiError::NoPendingRemainder)?;
        let request = AllocationRequest::new(i64::from(pending.remaining))?;
        self.execute_allocation(&request, AllocationStrategy::Direct { room_id })
    }

    fn execute_allocation(
        &mut self,
        request: &AllocationRequest,
        strategy: AllocationStrategy,
    ) -> ApiResult<CommandResult> {
        let mut working = self.catalog.clone();
        let outcome = self.engine.allocate(&mut working, request, strategy)?;

        if let Some(store) = &self.store {
            let touched: Vec<Room> = outcome
                .per_room_detail
                .iter()
                .filter_map(|a| working.get(a.room_id).cloned())
                .collect();
            store.rooms.update_occupancies(&touched)?;
        }
        self.catalog = working;

        // 分配成功后清除分析高亮
        self.highlights = HighlightSet::default();
        self.pending = match strategy {
            AllocationStrategy::Direct { room_id } if outcome.remaining > 0 => {
                Some(PendingRemainder {
                    source_room_id: room_id,
                    remaining: outcome.remaining,
                })
            }
            _ => None,
        };

        self.publish(AllocationEvent::Allocated(outcome.clone()));

        let assigned = outcome.assigned_total.to_string();
        let strategy_name = strategy.to_string();
        let message = match (self.pending, outcome.kind()) {
            (Some(pending), _) => {
                let room = self
                    .catalog
                    .get(pending.source_room_id)
                    .map(|r| r.name().to_string())
                    .unwrap_or_else(|| pending.source_room_id.to_string());
                let remaining = pending.remaining.to_string();
                t_with_args(
                    "allocation.pending_retarget",
                    &[("room", room.as_str()), ("remaining", remaining.as_str())],
                )
            }
            (None, OutcomeKind::Complete) => t_with_args(
                "allocation.complete",
                &[("assigned", assigned.as_str()), ("strategy", strategy_name.as_str())],
            ),
            (None, OutcomeKind::Partial | OutcomeKind::Exhausted) => {
                let remaining = outcome.remaining.to_string();
                t_with_args(
                    "allocation.partial",
                    &[
                        ("assigned", assigned.as_str()),
                        ("strategy", strategy_name.as_str()),
                        ("remaining", remaining.as_str()),
                    ],
                )
            }
        };

        self.command_result(Some(outcome), message)
    }

    // ==========================================
    // 人工修改
    // ==========================================

    /// 人工设置教室人数（默认截断到容量）
    #[instrument(skip(self))]
    pub fn set_occupancy(&mut self, room_id: RoomId, value: i64) -> ApiResult<CommandResult> {
        let mut working = self.catalog.clone();
        let previous = working
            .get(room_id)
            .map(|r| r.occupancy())
            .ok_or(ApiError::RoomNotFound { room_id })?;
        let room = self
            .manual_override
            .set_occupancy(&mut working, room_id, value)?;

        if let Some(store) = &self.store {
            store.rooms.update_occupancies(std::slice::from_ref(&room))?;
        }
        self.catalog = working;

        self.publish(AllocationEvent::OccupancyOverridden {
            room_id,
            room_name: room.name().to_string(),
            previous,
            current: room.occupancy(),
        });

        let occupancy = room.occupancy().to_string();
        let message = if room.has_capacity_anomaly() {
            let capacity = room.capacity().to_string();
            t_with_args(
                "override.anomaly",
                &[
                    ("room", room.name()),
                    ("occupancy", occupancy.as_str()),
                    ("capacity", capacity.as_str()),
                ],
            )
        } else {
            t_with_args(
                "override.applied",
                &[("room", room.name()), ("occupancy", occupancy.as_str())],
            )
        };

        self.command_result(None, message)
    }

    // ==========================================
    // 场次 / 目录
    // ==========================================

    /// 切换到下一场次并整体重新播种
    #[instrument(skip(self), fields(from = %self.current_session()))]
    pub fn switch_session(&mut self) -> ApiResult<CommandResult> {
        let session_count = self.config.sessions.len().max(1);
        let next_idx = (self.session_idx + 1) % session_count;

        let mut working = self.catalog.clone();
        let total = reseed_catalog(&mut working, self.seeder.as_mut())?;

        if let Some(store) = &self.store {
            store.rooms.replace_catalog_for_session(&working, next_idx)?;
        }
        self.catalog = working;
        self.session_idx = next_idx;

        let session = self.current_session().to_string();
        self.history.set_session(session.clone());
        self.highlights = HighlightSet::default();
        self.pending = None;

        info!(session = %session, total_occupancy = total, "场次切换完成");
        self.publish(AllocationEvent::CatalogReseeded {
            session: session.clone(),
            total_occupancy: total,
        });

        let total = total.to_string();
        let message = t_with_args(
            "session.switched",
            &[("session", session.as_str()), ("total", total.as_str())],
        );
        self.command_result(None, message)
    }

    /// 从 CSV 文件导入目录并整体替换
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_catalog(&mut self, path: &Path) -> ApiResult<CommandResult> {
        let catalog = CatalogImporter::new().import_file(path)?;
        self.replace_catalog(catalog)
    }

    /// 整体替换目录（清除高亮与待分配人数）
    pub fn replace_catalog(&mut self, catalog: RoomCatalog) -> ApiResult<CommandResult> {
        if let Some(store) = &self.store {
            store.rooms.replace_catalog(&catalog)?;
        }
        self.catalog = catalog;
        self.highlights = HighlightSet::default();
        self.pending = None;

        let count = self.catalog.len().to_string();
        info!(rooms = self.catalog.len(), "教室目录已替换");
        let message = t_with_args("import.completed", &[("count", count.as_str())]);
        self.command_result(None, message)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 写入会话历史并落库
    fn publish(&mut self, event: AllocationEvent) {
        if let Err(e) = self.history.publish(&event) {
            warn!("历史记录写入失败: {}", e);
            return;
        }

        if let (Some(store), Some(entry)) = (&self.store, self.history.latest()) {
            if let Err(e) = store.history.insert(entry) {
                warn!("历史记录落库失败: {}", e);
            }
        }
    }

    fn command_result(
        &self,
        outcome: Option<AllocationOutcome>,
        message: String,
    ) -> ApiResult<CommandResult> {
        Ok(CommandResult {
            rooms: self.room_views(CategoryFilter::All)?,
            outcome,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::HistoryAction;
    use crate::domain::types::{RoomCategory, RoomStatus};
    use crate::engine::seeding::FixedSeeder;

    fn session() -> AllocationApi {
        AllocationApi::new(RoomCatalog::default_catalog(), EngineConfig::default())
            .with_seeder(Box::new(FixedSeeder(10)))
    }

    fn stored_session() -> AllocationApi {
        let conn = Connection::open_in_memory().unwrap();
        AllocationApi::from_connection_with_seeder(
            Arc::new(Mutex::new(conn)),
            Box::new(FixedSeeder(10)),
        )
        .unwrap()
    }

    #[test]
    fn test_analyze_then_allocate_clears_highlights() {
        let mut api = session();
        api.set_occupancy(1, 70).unwrap();

        api.analyze("10", AnalyzeMode::ExactFit).unwrap();
        assert!(!api.highlights().contains(1));
        assert_eq!(api.highlights().len(), 8);

        api.allocate("10", AllocationStrategy::Direct { room_id: 2 })
            .unwrap();
        assert!(api.highlights().is_empty());
    }

    #[test]
    fn test_invalid_analyze_clears_highlights() {
        let mut api = session();
        api.analyze("5", AnalyzeMode::AnySpace).unwrap();
        assert_eq!(api.highlights().len(), 9);

        assert!(matches!(
            api.analyze("-3", AnalyzeMode::AnySpace),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(api.highlights().is_empty());
    }

    #[test]
    fn test_add_here_requires_highlight() {
        let mut api = session();
        assert!(matches!(
            api.add_here(1),
            Err(ApiError::RoomNotHighlighted { room_id: 1 })
        ));

        api.analyze_for("100", AllocationStrategy::Waterfall { start: None })
            .unwrap();
        let result = api.add_here(8).unwrap();
        let outcome = result.outcome.unwrap();
        assert_eq!(outcome.strategy, AllocationStrategy::Waterfall { start: Some(8) });
        assert_eq!(outcome.assigned_total, 100);
        assert_eq!(api.catalog().get(8).unwrap().occupancy(), 100);
    }

    #[test]
    fn test_add_here_uses_analyzed_count() {
        let mut api = session();
        api.analyze("5", AnalyzeMode::ExactFit).unwrap();

        let outcome = api.add_here(3).unwrap().outcome.unwrap();
        assert_eq!(outcome.strategy, AllocationStrategy::Direct { room_id: 3 });
        assert_eq!(outcome.requested, 5);
        assert_eq!(api.catalog().get(3).unwrap().occupancy(), 5);

        // 分配后高亮已清除，不能再次添加
        assert!(matches!(
            api.add_here(3),
            Err(ApiError::RoomNotHighlighted { room_id: 3 })
        ));
    }

    #[test]
    fn test_direct_surplus_becomes_pending_and_retargets() {
        let mut api = session();
        api.set_occupancy(1, 70).unwrap();

        let result = api
            .allocate("10", AllocationStrategy::Direct { room_id: 1 })
            .unwrap();
        assert!(result.message.contains("G-8 CSE A"));
        assert!(result.message.contains('8'));
        let outcome = result.outcome.unwrap();
        assert_eq!(outcome.assigned_total, 2);
        assert_eq!(outcome.remaining, 8);
        assert_eq!(
            api.pending(),
            Some(PendingRemainder {
                source_room_id: 1,
                remaining: 8
            })
        );
        assert_eq!(api.catalog().get(1).unwrap().status(), RoomStatus::Occupied);

        api.retarget_pending(2).unwrap();
        assert_eq!(api.catalog().get(2).unwrap().occupancy(), 8);
        assert!(api.pending().is_none());
        assert!(matches!(
            api.retarget_pending(3),
            Err(ApiError::NoPendingRemainder)
        ));
    }

    #[test]
    fn test_retarget_into_full_room_keeps_pending() {
        let mut api = session();
        api.set_occupancy(1, 70).unwrap();
        api.set_occupancy(2, 72).unwrap();
        api.allocate("10", AllocationStrategy::Direct { room_id: 1 })
            .unwrap();

        assert!(matches!(
            api.retarget_pending(2),
            Err(ApiError::AllocationExhausted {
                requested: 8,
                remaining: 8
            })
        ));
        assert_eq!(api.pending().map(|p| p.remaining), Some(8));
    }

    #[test]
    fn test_exhausted_leaves_state_untouched() {
        let mut api = session();
        for id in 1..=9 {
            let capacity = api.catalog().get(id).unwrap().capacity();
            api.set_occupancy(id, i64::from(capacity)).unwrap();
        }
        let before = api.catalog().clone();
        let history_len = api.history().count();

        assert!(matches!(
            api.allocate("5", AllocationStrategy::BestFit),
            Err(ApiError::AllocationExhausted {
                requested: 5,
                remaining: 5
            })
        ));
        assert_eq!(api.catalog(), &before);
        assert_eq!(api.history().count(), history_len);
    }

    #[test]
    fn test_switch_session_reseeds_and_records() {
        let mut api = session();
        assert_eq!(api.current_session(), "Morning Session");
        api.analyze("5", AnalyzeMode::AnySpace).unwrap();

        api.switch_session().unwrap();
        assert_eq!(api.current_session(), "Afternoon Session");
        assert!(api.highlights().is_empty());
        assert!(api.catalog().rooms().iter().all(|r| r.occupancy() == 10));

        let latest = api.history().next().unwrap();
        assert_eq!(latest.action, HistoryAction::SessionReseed);
        assert_eq!(latest.session.as_deref(), Some("Afternoon Session"));

        api.switch_session().unwrap();
        assert_eq!(api.current_session(), "Morning Session");
    }

    #[test]
    fn test_room_views_filter() {
        let mut api = session();
        api.analyze("80", AnalyzeMode::ExactFit).unwrap();

        let labs = api
            .room_views(CategoryFilter::Only(RoomCategory::Lab))
            .unwrap();
        assert_eq!(labs.len(), 2);
        assert!(labs.iter().find(|v| v.room_id == 8).unwrap().highlighted);
        assert!(!labs.iter().find(|v| v.room_id == 7).unwrap().highlighted);
    }

    #[test]
    fn test_anomaly_mode_from_config() {
        let config = EngineConfig {
            anomaly_test_mode: true,
            ..EngineConfig::default()
        };
        let mut api = AllocationApi::new(RoomCatalog::default_catalog(), config);

        api.set_occupancy(1, 80).unwrap();
        assert_eq!(api.capacity_anomalies(), vec![1]);
        let view = &api.room_views(CategoryFilter::All).unwrap()[0];
        assert!(view.anomaly);
        assert_eq!(view.status, RoomStatus::Occupied);
    }

    #[test]
    fn test_stored_session_persists_commands() {
        let mut api = stored_session();
        assert_eq!(api.catalog().len(), 9);

        api.allocate("700", AllocationStrategy::Waterfall { start: None })
            .unwrap();
        api.set_occupancy(9, 5).unwrap();

        let store = api.store.as_ref().unwrap();
        let reloaded = store.rooms.load_catalog().unwrap();
        assert_eq!(&reloaded, api.catalog());
        assert_eq!(reloaded.get(9).unwrap().occupancy(), 5);

        let history = api.persisted_history(10).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_fresh_store_is_seeded_once() {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let api = AllocationApi::from_connection_with_seeder(conn.clone(), Box::new(FixedSeeder(15)))
            .unwrap();
        assert!(api.catalog().rooms().iter().all(|r| r.occupancy() == 15));
        assert_eq!(api.catalog().total_free_space(), 728 - 9 * 15);

        // 非空库不重新播种
        let reloaded =
            AllocationApi::from_connection_with_seeder(conn, Box::new(FixedSeeder(40))).unwrap();
        assert_eq!(reloaded.catalog(), api.catalog());
        assert_eq!(reloaded.current_session(), "Morning Session");
    }

    #[test]
    fn test_stored_switch_session_replaces_rows() {
        let mut api = stored_session();
        api.switch_session().unwrap();

        let store = api.store.as_ref().unwrap();
        let reloaded = store.rooms.load_catalog().unwrap();
        assert!(reloaded.rooms().iter().all(|r| r.occupancy() == 10));
        assert_eq!(store.rooms.load_session_index().unwrap(), Some(1));
    }
}
