//! The built-in blueprint set, registered once at process start.

use serde_json::json;

use crate::blueprint::{BlueprintParameter, BlueprintParameterKind, ResourceBlueprint};
use crate::registry::BlueprintRegistry;

impl BlueprintRegistry {
    /// A registry preloaded with the built-in blueprints.
    pub fn builtin() -> Self {
        let registry = Self::new();
        for blueprint in builtin_blueprints() {
            // Built-in names are distinct by construction.
            if let Err(e) = registry.register(blueprint) {
                unreachable!("built-in blueprint failed to register: {}", e);
            }
        }
        registry
    }
}

fn parameter(
    name: &str,
    description: &str,
    kind: BlueprintParameterKind,
    required: bool,
    default: Option<serde_json::Value>,
    options: &[&str],
) -> BlueprintParameter {
    BlueprintParameter {
        name: name.to_string(),
        description: description.to_string(),
        kind,
        required,
        default,
        options: options.iter().map(|o| o.to_string()).collect(),
    }
}

/// The fixed built-in set: databases, caches, message queues and storage.
pub fn builtin_blueprints() -> Vec<ResourceBlueprint> {
    use BlueprintParameterKind::{Number, Select, String as Str};

    vec![
        ResourceBlueprint {
            name: "postgres-db".to_string(),
            description: "A PostgreSQL Database".to_string(),
            category: "database".to_string(),
            docker_compose_snippet: r#"image: postgres:{{ version }}
environment:
  - POSTGRES_DB={{ databaseName }}
  - POSTGRES_USER={{ username }}
  - POSTGRES_PASSWORD={{ password }}
volumes:
  - postgres_data:/var/lib/postgresql/data
ports:
  - "{{ port }}:5432"
healthcheck:
  test: ["CMD-SHELL", "pg_isready -U {{ username }} -d {{ databaseName }}"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/rds-postgres".to_string(),
            parameters: vec![
                parameter("version", "PostgreSQL version", Select, true, Some(json!("16")), &["13", "14", "15", "16"]),
                parameter("databaseName", "Database name", Str, true, Some(json!("app")), &[]),
                parameter("username", "Database username", Str, true, Some(json!("postgres")), &[]),
                parameter("password", "Database password", Str, true, None, &[]),
                parameter("port", "Database port", Number, false, Some(json!(5432)), &[]),
            ],
            depends_on: Vec::new(),
        },
        ResourceBlueprint {
            name: "mysql-db".to_string(),
            description: "A MySQL Database".to_string(),
            category: "database".to_string(),
            docker_compose_snippet: r#"image: mysql:{{ version }}
environment:
  - MYSQL_DATABASE={{ databaseName }}
  - MYSQL_USER={{ username }}
  - MYSQL_PASSWORD={{ password }}
  - MYSQL_ROOT_PASSWORD={{ rootPassword }}
volumes:
  - mysql_data:/var/lib/mysql
ports:
  - "{{ port }}:3306"
healthcheck:
  test: ["CMD", "mysqladmin", "ping", "-h", "localhost"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/rds-mysql".to_string(),
            parameters: vec![
                parameter("version", "MySQL version", Select, true, Some(json!("8.0")), &["5.7", "8.0"]),
                parameter("databaseName", "Database name", Str, true, Some(json!("app")), &[]),
                parameter("username", "Database username", Str, true, Some(json!("app")), &[]),
                parameter("password", "Database password", Str, true, None, &[]),
                parameter("rootPassword", "Root password", Str, true, None, &[]),
                parameter("port", "Database port", Number, false, Some(json!(3306)), &[]),
            ],
            depends_on: Vec::new(),
        },
        ResourceBlueprint {
            name: "mongodb".to_string(),
            description: "A MongoDB Database".to_string(),
            category: "database".to_string(),
            docker_compose_snippet: r#"image: mongo:{{ version }}
environment:
  - MONGO_INITDB_DATABASE={{ databaseName }}
  - MONGO_INITDB_ROOT_USERNAME={{ username }}
  - MONGO_INITDB_ROOT_PASSWORD={{ password }}
volumes:
  - mongodb_data:/data/db
ports:
  - "{{ port }}:27017"
healthcheck:
  test: ["CMD", "mongosh", "--eval", "db.adminCommand('ping')"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/documentdb".to_string(),
            parameters: vec![
                parameter("version", "MongoDB version", Select, true, Some(json!("7.0")), &["6.0", "7.0"]),
                parameter("databaseName", "Database name", Str, true, Some(json!("app")), &[]),
                parameter("username", "Database username", Str, true, Some(json!("admin")), &[]),
                parameter("password", "Database password", Str, true, None, &[]),
                parameter("port", "Database port", Number, false, Some(json!(27017)), &[]),
            ],
            depends_on: Vec::new(),
        },
        ResourceBlueprint {
            name: "redis-cache".to_string(),
            description: "A Redis Cache".to_string(),
            category: "cache".to_string(),
            docker_compose_snippet: r#"image: redis:{{ version }}
command: redis-server --requirepass {{ password }}
volumes:
  - redis_data:/data
ports:
  - "{{ port }}:6379"
healthcheck:
  test: ["CMD", "redis-cli", "--raw", "incr", "ping"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/elasticache-redis".to_string(),
            parameters: vec![
                parameter("version", "Redis version", Select, true, Some(json!("7.2")), &["6.2", "7.0", "7.2"]),
                parameter("password", "Redis password", Str, true, None, &[]),
                parameter("port", "Redis port", Number, false, Some(json!(6379)), &[]),
            ],
            depends_on: Vec::new(),
        },
        ResourceBlueprint {
            name: "memcached".to_string(),
            description: "A Memcached Cache".to_string(),
            category: "cache".to_string(),
            docker_compose_snippet: r#"image: memcached:{{ version }}
ports:
  - "{{ port }}:11211"
healthcheck:
  test: ["CMD", "memcached-tool", "localhost:11211", "stats"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/elasticache-memcached".to_string(),
            parameters: vec![
                parameter("version", "Memcached version", Select, true, Some(json!("1.6")), &["1.6"]),
                parameter("port", "Memcached port", Number, false, Some(json!(11211)), &[]),
            ],
            depends_on: Vec::new(),
        },
        ResourceBlueprint {
            name: "rabbitmq".to_string(),
            description: "A RabbitMQ Message Queue".to_string(),
            category: "message-queue".to_string(),
            docker_compose_snippet: r#"image: rabbitmq:{{ version }}-management
environment:
  - RABBITMQ_DEFAULT_USER={{ username }}
  - RABBITMQ_DEFAULT_PASS={{ password }}
volumes:
  - rabbitmq_data:/var/lib/rabbitmq
ports:
  - "{{ port }}:5672"
  - "15672:15672"
healthcheck:
  test: ["CMD", "rabbitmq-diagnostics", "ping"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/mq-rabbitmq".to_string(),
            parameters: vec![
                parameter("version", "RabbitMQ version", Select, true, Some(json!("3.12")), &["3.11", "3.12"]),
                parameter("username", "RabbitMQ username", Str, true, Some(json!("admin")), &[]),
                parameter("password", "RabbitMQ password", Str, true, None, &[]),
                parameter("port", "RabbitMQ port", Number, false, Some(json!(5672)), &[]),
            ],
            depends_on: Vec::new(),
        },
        ResourceBlueprint {
            name: "kafka".to_string(),
            description: "An Apache Kafka Message Broker".to_string(),
            category: "message-queue".to_string(),
            docker_compose_snippet: r#"image: confluentinc/cp-kafka:{{ version }}
environment:
  - KAFKA_BROKER_ID=1
  - KAFKA_ZOOKEEPER_CONNECT=zookeeper:2181
  - KAFKA_ADVERTISED_LISTENERS=PLAINTEXT://localhost:{{ port }}
  - KAFKA_OFFSETS_TOPIC_REPLICATION_FACTOR=1
ports:
  - "{{ port }}:9092"
healthcheck:
  test: ["CMD", "kafka-topics", "--bootstrap-server", "localhost:9092", "--list"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/msk-kafka".to_string(),
            parameters: vec![
                parameter("version", "Kafka version", Select, true, Some(json!("7.5.0")), &["7.4.0", "7.5.0"]),
                parameter("port", "Kafka port", Number, false, Some(json!(9092)), &[]),
            ],
            depends_on: vec!["zookeeper".to_string()],
        },
        ResourceBlueprint {
            name: "zookeeper".to_string(),
            description: "A ZooKeeper Coordination Service".to_string(),
            category: "message-queue".to_string(),
            docker_compose_snippet: r#"image: confluentinc/cp-zookeeper:{{ version }}
environment:
  - ZOOKEEPER_CLIENT_PORT={{ port }}
  - ZOOKEEPER_TICK_TIME=2000
ports:
  - "{{ port }}:2181"
"#
            .to_string(),
            terraform_module: "modules/aws/zookeeper".to_string(),
            parameters: vec![
                parameter("version", "ZooKeeper version", Select, true, Some(json!("7.5.0")), &["7.4.0", "7.5.0"]),
                parameter("port", "Client port", Number, false, Some(json!(2181)), &[]),
            ],
            depends_on: Vec::new(),
        },
        ResourceBlueprint {
            name: "object-store".to_string(),
            description: "An S3-compatible Object Store".to_string(),
            category: "storage".to_string(),
            docker_compose_snippet: r#"image: minio/minio:{{ version }}
command: server /data --console-address ":9001"
environment:
  - MINIO_ROOT_USER={{ accessKey }}
  - MINIO_ROOT_PASSWORD={{ secretKey }}
volumes:
  - minio_data:/data
ports:
  - "{{ port }}:9000"
  - "9001:9001"
healthcheck:
  test: ["CMD", "mc", "ready", "local"]
  interval: 10s
  timeout: 5s
  retries: 5
"#
            .to_string(),
            terraform_module: "modules/aws/s3-bucket".to_string(),
            parameters: vec![
                parameter("version", "MinIO version", Str, true, Some(json!("latest")), &[]),
                parameter("accessKey", "Root access key", Str, true, Some(json!("minioadmin")), &[]),
                parameter("secretKey", "Root secret key", Str, true, None, &[]),
                parameter("port", "API port", Number, false, Some(json!(9000)), &[]),
            ],
            depends_on: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = BlueprintRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec![
                "kafka",
                "memcached",
                "mongodb",
                "mysql-db",
                "object-store",
                "postgres-db",
                "rabbitmq",
                "redis-cache",
                "zookeeper",
            ]
        );
        assert_eq!(
            registry.categories(),
            vec!["cache", "database", "message-queue", "storage"]
        );
    }

    #[test]
    fn test_builtin_mandatory_parameters() {
        let registry = BlueprintRegistry::builtin();
        let redis = registry.get("redis-cache").unwrap();
        let mandatory: Vec<_> = redis
            .mandatory_parameters()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(mandatory, vec!["password"]);
    }

    #[test]
    fn test_kafka_expects_zookeeper() {
        let registry = BlueprintRegistry::builtin();
        let kafka = registry.get("kafka").unwrap();
        assert_eq!(kafka.depends_on, vec!["zookeeper"]);
        assert!(registry.contains("zookeeper"));
    }
}
