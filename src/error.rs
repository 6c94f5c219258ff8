//! Errores de carga de niveles y de configuración. Dentro de la simulación no hay
//! errores recuperables: todo lo raro se resuelve con un valor por defecto.

#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    /// Fila con un carácter que no es una cifra hexadecimal.
    BadRow { row: usize, column: usize, found: char },
    /// Más de 64 filas o columnas.
    TooLarge { rows: usize, columns: usize },
    /// Coordenada de tile fuera del mapa.
    OutOfBounds { what: &'static str, x: i32, y: i32 },
    /// El jugador aparece dentro de una pared.
    SpawnInWall { x: i32, y: i32 },
    /// Un interruptor de puerta apunta a una puerta que no existe.
    BadSwitchLink { switch: usize, door: usize },
    /// Más sectores secretos de los que se pueden seguir.
    TooManySecrets { count: usize },
    /// Un teletransporte deja al jugador dentro de una pared.
    TeleportIntoWall { x: i32, y: i32 },
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Yaml(err) => write!(f, "yaml error: {err}"),
            Self::BadRow { row, column, found } => write!(f, "row {row}, column {column}: bad tile {found:?}"),
            Self::TooLarge { rows, columns } => write!(f, "level is {columns}x{rows}, max is 64x64"),
            Self::OutOfBounds { what, x, y } => write!(f, "{what} at ({x}, {y}) is outside the map"),
            Self::SpawnInWall { x, y } => write!(f, "spawn at ({x}, {y}) is inside a wall"),
            Self::BadSwitchLink { switch, door } => write!(f, "switch {switch} links to missing door {door}"),
            Self::TooManySecrets { count } => write!(f, "{count} secret sectors, max is 4"),
            Self::TeleportIntoWall { x, y } => write!(f, "teleport destination ({x}, {y}) is inside a wall"),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<std::io::Error> for LevelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for LevelError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Level(LevelError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Yaml(err) => write!(f, "yaml error: {err}"),
            Self::Level(err) => write!(f, "level error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

impl From<LevelError> for ConfigError {
    fn from(err: LevelError) -> Self {
        Self::Level(err)
    }
}
