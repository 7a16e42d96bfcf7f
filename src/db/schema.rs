use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        -- Configuración del negocio
        CREATE TABLE IF NOT EXISTS config (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        INSERT OR IGNORE INTO config (key, value) VALUES ('nombre_agencia', 'Inmobiliaria');
        INSERT OR IGNORE INTO config (key, value) VALUES ('email_service_url', '');
        INSERT OR IGNORE INTO config (key, value) VALUES ('email_service_api_key', '');

        -- Identidad: credenciales, sesiones y recuperación de contraseña
        CREATE TABLE IF NOT EXISTS credenciales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE CONSTRAINT email_valido CHECK (email LIKE '%_@_%._%'),
            contrasena_hash TEXT NOT NULL,
            contrasena_salt TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );

        CREATE TABLE IF NOT EXISTS sesiones (
            token TEXT PRIMARY KEY,
            credencial_id INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (credencial_id) REFERENCES credenciales(id)
        );

        CREATE TABLE IF NOT EXISTS tokens_restablecimiento (
            token TEXT PRIMARY KEY,
            credencial_id INTEGER NOT NULL,
            expira_en TEXT NOT NULL,
            usado INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (credencial_id) REFERENCES credenciales(id)
        );

        -- Último envío de recuperación por usuario (límite de una hora)
        CREATE TABLE IF NOT EXISTS restablecimientos (
            usuario_id INTEGER PRIMARY KEY,
            ultimo_envio TEXT NOT NULL
        );

        -- Usuarios (perfil; uid = id de la credencial)
        CREATE TABLE IF NOT EXISTS usuarios (
            uid INTEGER PRIMARY KEY,
            email TEXT NOT NULL,
            nombre TEXT NOT NULL,
            apellidos TEXT NOT NULL DEFAULT '',
            rol TEXT NOT NULL CHECK (rol IN ('administrador', 'empleado', 'vendedor')),
            telefono TEXT NOT NULL DEFAULT '',
            vigencia TEXT NOT NULL DEFAULT 'ACTIVO',
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
            FOREIGN KEY (uid) REFERENCES credenciales(id)
        );

        CREATE INDEX IF NOT EXISTS idx_usuarios_vigencia ON usuarios(vigencia);

        -- Clientes
        CREATE TABLE IF NOT EXISTS clientes (
            uid INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre_completo TEXT NOT NULL,
            telefono TEXT NOT NULL,
            tipo_inmueble TEXT NOT NULL DEFAULT '',
            precio_min REAL NOT NULL DEFAULT 0,
            precio_max REAL NOT NULL DEFAULT 0,
            direccion TEXT NOT NULL DEFAULT '',
            zona TEXT NOT NULL DEFAULT '',
            fecha_registro TEXT NOT NULL,
            vigencia TEXT NOT NULL DEFAULT 'ACTIVO',
            updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );

        CREATE INDEX IF NOT EXISTS idx_clientes_vigencia ON clientes(vigencia);

        -- Inmuebles (codigo único solo entre activos, se verifica al crear)
        CREATE TABLE IF NOT EXISTS inmuebles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            codigo TEXT NOT NULL,
            tipo TEXT NOT NULL,
            direccion TEXT NOT NULL,
            ubicacion_url TEXT NOT NULL,
            zona TEXT NOT NULL,
            area TEXT NOT NULL,
            precio_venta REAL NOT NULL,
            precio_propietario REAL NOT NULL,
            precio_m2 REAL NOT NULL,
            imagenes_urls TEXT NOT NULL DEFAULT '[]',
            estado TEXT NOT NULL DEFAULT 'disponible',
            numero_pisos INTEGER NOT NULL,
            superficie REAL NOT NULL,
            superficie_construida REAL NOT NULL,
            frente REAL NOT NULL,
            caracteristicas TEXT NOT NULL,
            servicios TEXT NOT NULL DEFAULT '[]',
            propietario_nombre_completo TEXT NOT NULL,
            propietario_telefono TEXT NOT NULL,
            propietario_ci TEXT NOT NULL,
            propietario_domicilio TEXT NOT NULL,
            propietario_telefono_familiar TEXT NOT NULL DEFAULT '',
            propietario_nombre_familiar TEXT NOT NULL DEFAULT '',
            propietario_procedencia TEXT NOT NULL DEFAULT '',
            fecha_registro TEXT NOT NULL,
            fecha_vencimiento TEXT NOT NULL,
            vigencia TEXT NOT NULL DEFAULT 'ACTIVO',
            updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );

        CREATE INDEX IF NOT EXISTS idx_inmuebles_codigo ON inmuebles(codigo);
        CREATE INDEX IF NOT EXISTS idx_inmuebles_vigencia ON inmuebles(vigencia);
        ",
    )?;

    Ok(())
}
