use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::identity::CallerIdentity;

use crate::error::TimeSlotError;
use crate::models::{CreateBoardRequest, RefreshStatus};
use crate::services::board::{ensure_editable, SlotBoard};
use crate::services::departments::DepartmentDirectory;
use crate::services::store::{with_deadline, AvailabilityStore, HttpAvailabilityStore};

pub type SharedBoard = Arc<Mutex<SlotBoard>>;

struct BoardEntry {
    board: SharedBoard,
    last_touched: Instant,
}

/// Open boards, one per operator view. Each board sits behind its own lock.
///
/// Boards nobody has touched for the idle timeout are evicted.
pub struct BoardRegistry {
    boards: RwLock<HashMap<Uuid, BoardEntry>>,
    store: Arc<dyn AvailabilityStore>,
    hospital_id: i64,
    timeout: Duration,
    idle_timeout: Duration,
}

impl BoardRegistry {
    pub fn new(config: &AppConfig, store: Arc<dyn AvailabilityStore>) -> Self {
        Self {
            boards: RwLock::new(HashMap::new()),
            store,
            hospital_id: config.hospital_id,
            timeout: config.store_timeout(),
            idle_timeout: config.board_idle_timeout(),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    async fn load_directory(
        &self,
        identity: &CallerIdentity,
    ) -> Result<DepartmentDirectory, TimeSlotError> {
        with_deadline(
            self.timeout,
            self.store.list_departments(identity, self.hospital_id),
        )
        .await
        .map(DepartmentDirectory::new)
    }

    /// Department directory for `identity`, or the built-in list when it
    /// cannot be loaded.
    pub async fn departments(&self, identity: Option<&CallerIdentity>) -> DepartmentDirectory {
        let Some(identity) = identity else {
            return DepartmentDirectory::fallback();
        };

        match self.load_directory(identity).await {
            Ok(directory) => directory,
            Err(e) => {
                debug!("Department lookup failed ({}), using fallback list", e);
                DepartmentDirectory::fallback()
            }
        }
    }

    /// Reloads a board's directory with the board's identity. The current
    /// directory stays in place if the lookup fails.
    pub async fn refresh_directory(&self, board: &mut SlotBoard) {
        let Some(identity) = board.context().identity.clone() else {
            return;
        };

        match self.load_directory(&identity).await {
            Ok(directory) => board.set_directory(directory),
            Err(e) => debug!("Keeping current department list: {}", e),
        }
    }

    /// Opens a board and loads it when a department is given. The board is
    /// only registered if loading succeeds.
    pub async fn create(
        &self,
        identity: Option<CallerIdentity>,
        request: CreateBoardRequest,
    ) -> Result<(Uuid, SharedBoard, RefreshStatus), TimeSlotError> {
        ensure_editable(request.date)?;
        self.evict_idle().await;

        let directory = self.departments(identity.as_ref()).await;
        let mut board = SlotBoard::new(self.store.clone(), directory, request.date, self.timeout);
        board.set_identity(identity);

        let status = match request.department_id {
            Some(department_id) => board.select_department(department_id).await?,
            None => RefreshStatus::AwaitingDepartment,
        };

        let board_id = Uuid::new_v4();
        let board = Arc::new(Mutex::new(board));
        self.boards.write().await.insert(
            board_id,
            BoardEntry {
                board: board.clone(),
                last_touched: Instant::now(),
            },
        );

        info!("Opened board {} for {}", board_id, request.date);
        Ok((board_id, board, status))
    }

    pub async fn get(&self, board_id: Uuid) -> Result<SharedBoard, TimeSlotError> {
        let mut boards = self.boards.write().await;
        let entry = boards
            .get_mut(&board_id)
            .ok_or(TimeSlotError::BoardNotFound(board_id))?;
        entry.last_touched = Instant::now();
        Ok(entry.board.clone())
    }

    pub async fn remove(&self, board_id: Uuid) -> Result<(), TimeSlotError> {
        self.boards
            .write()
            .await
            .remove(&board_id)
            .map(|_| info!("Closed board {}", board_id))
            .ok_or(TimeSlotError::BoardNotFound(board_id))
    }

    /// Drops boards idle for longer than the idle timeout; returns how many.
    pub async fn evict_idle(&self) -> usize {
        let idle_timeout = self.idle_timeout;
        let mut boards = self.boards.write().await;
        let before = boards.len();

        boards.retain(|board_id, entry| {
            let idle = entry.last_touched.elapsed() >= idle_timeout;
            if idle {
                debug!("Evicting idle board {}", board_id);
            }
            !idle
        });

        before - boards.len()
    }

    pub async fn len(&self) -> usize {
        self.boards.read().await.len()
    }
}

/// Router state for the time-slot endpoints.
pub struct TimeSlotState {
    pub config: Arc<AppConfig>,
    pub registry: BoardRegistry,
}

impl TimeSlotState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn AvailabilityStore>) -> Self {
        let registry = BoardRegistry::new(&config, store);
        Self { config, registry }
    }

    /// State backed by the admin API configured in `config`.
    pub fn from_config(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let store: Arc<dyn AvailabilityStore> = Arc::new(HttpAvailabilityStore::new(&config)?);
        Ok(Self::new(config, store))
    }

    /// Periodically evicts idle boards for as long as the process runs.
    pub fn spawn_idle_sweeper(state: Arc<Self>) -> JoinHandle<()> {
        let period = state.registry.idle_timeout().max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut sweep_interval = interval(period);

            loop {
                sweep_interval.tick().await;

                let evicted = state.registry.evict_idle().await;
                if evicted > 0 {
                    info!("Evicted {} idle boards", evicted);
                }
            }
        })
    }
}
