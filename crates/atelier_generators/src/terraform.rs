//! Terraform generator.
//!
//! Emits a Terraform configuration for cloud deployment of the project:
//! shared networking and cluster scaffolding, one ECS service block per
//! manifest service and component, and one module block per service-owned
//! resource, sourced from the resource blueprint's infrastructure module.

use std::sync::Arc;

use tracing::debug;

use atelier_manifest::{Component, ProjectManifest, Service};
use atelier_resources::BlueprintRegistry;

use crate::error::GeneratorError;
use crate::generator::{GeneratedArtifacts, Generator};

/// Generates Terraform configuration for cloud infrastructure.
pub struct TerraformGenerator {
    blueprints: Arc<BlueprintRegistry>,
}

impl TerraformGenerator {
    pub fn new(blueprints: Arc<BlueprintRegistry>) -> Self {
        Self { blueprints }
    }

    fn main_tf(&self, manifest: &ProjectManifest) -> Result<String, GeneratorError> {
        let mut content = format!(
            r#"# Terraform configuration for {name}

terraform {{
  required_version = ">= 1.0"
  required_providers {{
    aws = {{
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }}
  }}
}}

provider "aws" {{
  region = var.aws_region
}}

# VPC and networking
resource "aws_vpc" "main" {{
  cidr_block           = var.vpc_cidr
  enable_dns_hostnames = true
  enable_dns_support   = true

  tags = {{
    Name = "${{var.project_name}}-vpc"
  }}
}}

resource "aws_subnet" "public" {{
  vpc_id            = aws_vpc.main.id
  cidr_block        = var.public_subnet_cidr
  availability_zone = var.availability_zone

  tags = {{
    Name = "${{var.project_name}}-public-subnet"
  }}
}}

resource "aws_internet_gateway" "main" {{
  vpc_id = aws_vpc.main.id

  tags = {{
    Name = "${{var.project_name}}-igw"
  }}
}}

resource "aws_security_group" "app" {{
  name_prefix = "${{var.project_name}}-app-"
  vpc_id      = aws_vpc.main.id

  ingress {{
    from_port   = 80
    to_port     = 80
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }}

  ingress {{
    from_port   = 443
    to_port     = 443
    protocol    = "tcp"
    cidr_blocks = ["0.0.0.0/0"]
  }}

  egress {{
    from_port   = 0
    to_port     = 0
    protocol    = "-1"
    cidr_blocks = ["0.0.0.0/0"]
  }}

  tags = {{
    Name = "${{var.project_name}}-app-sg"
  }}
}}

# ECS Cluster
resource "aws_ecs_cluster" "main" {{
  name = "${{var.project_name}}-cluster"

  setting {{
    name  = "containerInsights"
    value = "enabled"
  }}

  tags = {{
    Name = "${{var.project_name}}-cluster"
  }}
}}

# Application Load Balancer
resource "aws_lb" "main" {{
  name               = "${{var.project_name}}-alb"
  internal           = false
  load_balancer_type = "application"
  security_groups    = [aws_security_group.app.id]
  subnets            = [aws_subnet.public.id]

  tags = {{
    Name = "${{var.project_name}}-alb"
  }}
}}

resource "aws_lb_listener" "http" {{
  load_balancer_arn = aws_lb.main.arn
  port              = "80"
  protocol          = "HTTP"

  default_action {{
    type = "redirect"

    redirect {{
      port        = "443"
      protocol    = "HTTPS"
      status_code = "HTTP_301"
    }}
  }}
}}
"#,
            name = manifest.metadata.name
        );

        for (name, service) in &manifest.services {
            content.push_str(&service_blocks(name, service));
            content.push_str(&self.resource_modules(name, service)?);
        }
        for (name, component) in &manifest.components {
            content.push_str(&component_blocks(name, component));
        }

        Ok(content)
    }

    /// One module block per service-owned resource, sourced from the
    /// blueprint's infrastructure module.
    fn resource_modules(
        &self,
        service_name: &str,
        service: &Service,
    ) -> Result<String, GeneratorError> {
        let mut content = String::new();
        for (resource_name, resource) in &service.resources {
            let blueprint = self.blueprints.get(&resource.resource_type).map_err(|e| {
                GeneratorError::validation(format!("resource '{}': {}", resource_name, e))
            })?;
            debug!(resource = %resource_name, module = %blueprint.terraform_module, "adding resource module");

            content.push_str(&format!(
                "\n# Resource: {service}/{resource} ({kind})\nmodule \"{service}_{resource}\" {{\n  source = \"{module}\"\n\n  project_name = var.project_name\n",
                service = service_name,
                resource = resource_name,
                kind = resource.resource_type,
                module = blueprint.terraform_module,
            ));
            if let Some(version) = &resource.version {
                content.push_str(&format!("  engine_version = \"{}\"\n", version));
            }
            for (key, value) in &resource.config {
                content.push_str(&format!("  {} = \"{}\"\n", key, value));
            }
            content.push_str("}\n");
        }
        Ok(content)
    }

    fn variables_tf(&self, manifest: &ProjectManifest) -> String {
        let mut content = format!(
            r#"# Variables for {name}

variable "aws_region" {{
  description = "AWS region"
  type        = string
  default     = "{region}"
}}

variable "project_name" {{
  description = "Project name"
  type        = string
  default     = "{name}"
}}

variable "vpc_cidr" {{
  description = "CIDR block for VPC"
  type        = string
  default     = "10.0.0.0/16"
}}

variable "public_subnet_cidr" {{
  description = "CIDR block for public subnet"
  type        = string
  default     = "10.0.1.0/24"
}}

variable "availability_zone" {{
  description = "Availability zone"
  type        = string
  default     = "us-east-1a"
}}
"#,
            name = manifest.metadata.name,
            region = default_region(manifest),
        );

        for name in manifest.services.keys().chain(manifest.components.keys()) {
            content.push_str(&unit_variables(name));
        }
        content
    }

    fn outputs_tf(&self, manifest: &ProjectManifest) -> String {
        let mut content = format!(
            r#"# Outputs for {name}

output "vpc_id" {{
  description = "VPC ID"
  value       = aws_vpc.main.id
}}

output "alb_dns_name" {{
  description = "Application Load Balancer DNS name"
  value       = aws_lb.main.dns_name
}}

output "ecs_cluster_name" {{
  description = "ECS cluster name"
  value       = aws_ecs_cluster.main.name
}}
"#,
            name = manifest.metadata.name
        );

        for name in manifest.services.keys() {
            content.push_str(&format!(
                r#"
output "{name}_service_name" {{
  description = "{name} service name"
  value       = aws_ecs_service.{name}.name
}}
"#,
                name = name
            ));
        }
        content
    }

    fn tfvars_example(&self, manifest: &ProjectManifest) -> String {
        let mut content = format!(
            r#"# Example terraform.tfvars for {name}

aws_region = "{region}"
project_name = "{name}"
vpc_cidr = "10.0.0.0/16"
public_subnet_cidr = "10.0.1.0/24"
availability_zone = "us-east-1a"
"#,
            name = manifest.metadata.name,
            region = default_region(manifest),
        );

        for name in manifest.services.keys().chain(manifest.components.keys()) {
            content.push_str(&format!(
                "\n# {name} configuration\n{name}_desired_count = 1\n{name}_cpu = 256\n{name}_memory = 512\n{name}_image = \"nginx:alpine\"\n",
                name = name
            ));
        }
        content
    }
}

impl Generator for TerraformGenerator {
    fn name(&self) -> &str {
        "terraform"
    }

    fn description(&self) -> &str {
        "Generate Terraform configuration for cloud infrastructure"
    }

    fn validate(&self, manifest: &ProjectManifest) -> Result<(), GeneratorError> {
        let mut issues = Vec::new();

        if manifest.metadata.name.trim().is_empty() {
            issues.push("project name is required".to_string());
        }
        if manifest.services.is_empty() {
            issues.push("at least one service is required".to_string());
        }
        if manifest.environments.is_empty() {
            issues.push(
                "at least one environment must be configured for Terraform generation".to_string(),
            );
        }
        for (service_name, service) in &manifest.services {
            for (resource_name, resource) in &service.resources {
                if !self.blueprints.contains(&resource.resource_type) {
                    issues.push(format!(
                        "service '{}' resource '{}' references unknown type '{}'",
                        service_name, resource_name, resource.resource_type
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(GeneratorError::Validation(issues))
        }
    }

    fn generate(&self, manifest: &ProjectManifest) -> Result<GeneratedArtifacts, GeneratorError> {
        self.validate(manifest)?;

        let mut artifacts = GeneratedArtifacts::new();
        artifacts.add_file("terraform/main.tf", self.main_tf(manifest)?);
        artifacts.add_file("terraform/variables.tf", self.variables_tf(manifest));
        artifacts.add_file("terraform/outputs.tf", self.outputs_tf(manifest));
        artifacts.add_file(
            "terraform/terraform.tfvars.example",
            self.tfvars_example(manifest),
        );
        artifacts.add_message("generated Terraform configuration under terraform/");

        Ok(artifacts)
    }
}

fn default_region(manifest: &ProjectManifest) -> String {
    manifest
        .environments
        .values()
        .find_map(|e| e.region.clone())
        .unwrap_or_else(|| "us-east-1".to_string())
}

fn service_blocks(name: &str, service: &Service) -> String {
    let port = service.port.unwrap_or(80);
    format!(
        r#"
# Service: {name}
resource "aws_ecs_service" "{name}" {{
  name            = "{name}"
  cluster         = aws_ecs_cluster.main.id
  task_definition = aws_ecs_task_definition.{name}.arn
  desired_count   = var.{name}_desired_count

  network_configuration {{
    subnets         = [aws_subnet.public.id]
    security_groups = [aws_security_group.app.id]
  }}

  load_balancer {{
    target_group_arn = aws_lb_target_group.{name}.arn
    container_name   = "{name}"
    container_port   = {port}
  }}

  depends_on = [aws_lb_listener.http]

  tags = {{
    Name = "{name}"
  }}
}}

resource "aws_ecs_task_definition" "{name}" {{
  family                   = "{name}"
  network_mode             = "awsvpc"
  requires_compatibilities = ["FARGATE"]
  cpu                      = var.{name}_cpu
  memory                   = var.{name}_memory

  container_definitions = jsonencode([
    {{
      name  = "{name}"
      image = var.{name}_image
      portMappings = [
        {{
          containerPort = {port}
          protocol      = "tcp"
        }}
      ]
      logConfiguration = {{
        logDriver = "awslogs"
        options = {{
          awslogs-group         = "/ecs/{name}"
          awslogs-region        = var.aws_region
          awslogs-stream-prefix = "ecs"
        }}
      }}
    }}
  ])

  tags = {{
    Name = "{name}"
  }}
}}

resource "aws_lb_target_group" "{name}" {{
  name     = "{name}-tg"
  port     = {port}
  protocol = "HTTP"
  vpc_id   = aws_vpc.main.id

  health_check {{
    enabled             = true
    healthy_threshold   = 2
    interval            = 30
    matcher             = "200"
    path                = "/"
    port                = "traffic-port"
    protocol            = "HTTP"
    timeout             = 5
    unhealthy_threshold = 2
  }}

  tags = {{
    Name = "{name}-tg"
  }}
}}
"#,
        name = name,
        port = port
    )
}

fn component_blocks(name: &str, _component: &Component) -> String {
    format!(
        r#"
# Component: {name}
resource "aws_ecs_service" "{name}" {{
  name            = "{name}"
  cluster         = aws_ecs_cluster.main.id
  task_definition = aws_ecs_task_definition.{name}.arn
  desired_count   = var.{name}_desired_count

  network_configuration {{
    subnets         = [aws_subnet.public.id]
    security_groups = [aws_security_group.app.id]
  }}

  tags = {{
    Name = "{name}"
  }}
}}

resource "aws_ecs_task_definition" "{name}" {{
  family                   = "{name}"
  network_mode             = "awsvpc"
  requires_compatibilities = ["FARGATE"]
  cpu                      = var.{name}_cpu
  memory                   = var.{name}_memory

  container_definitions = jsonencode([
    {{
      name  = "{name}"
      image = var.{name}_image
      portMappings = [
        {{
          containerPort = 80
          protocol      = "tcp"
        }}
      ]
      logConfiguration = {{
        logDriver = "awslogs"
        options = {{
          awslogs-group         = "/ecs/{name}"
          awslogs-region        = var.aws_region
          awslogs-stream-prefix = "ecs"
        }}
      }}
    }}
  ])

  tags = {{
    Name = "{name}"
  }}
}}
"#,
        name = name
    )
}

fn unit_variables(name: &str) -> String {
    format!(
        r#"
variable "{name}_desired_count" {{
  description = "Desired count for {name}"
  type        = number
  default     = 1
}}

variable "{name}_cpu" {{
  description = "CPU units for {name}"
  type        = number
  default     = 256
}}

variable "{name}_memory" {{
  description = "Memory for {name}"
  type        = number
  default     = 512
}}

variable "{name}_image" {{
  description = "Docker image for {name}"
  type        = string
  default     = "nginx:alpine"
}}
"#,
        name = name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_manifest::{Environment, ResourceInstance};
    use std::collections::BTreeMap;

    fn manifest() -> ProjectManifest {
        let mut manifest = ProjectManifest::new("shop");
        manifest.environments.insert(
            "production".to_string(),
            Environment {
                provider: "aws".to_string(),
                region: Some("eu-west-1".to_string()),
                config: BTreeMap::new(),
            },
        );
        let mut resources = BTreeMap::new();
        resources.insert(
            "maindb".to_string(),
            ResourceInstance {
                resource_type: "postgres-db".to_string(),
                version: Some("16".to_string()),
                config: BTreeMap::from([(
                    "databaseName".to_string(),
                    "shop".to_string(),
                )]),
            },
        );
        manifest
            .add_service(
                "backend",
                Service {
                    template: "fastapi-basic".to_string(),
                    path: "./backend".to_string(),
                    port: Some(8000),
                    resources,
                    environment: BTreeMap::new(),
                },
            )
            .unwrap();
        manifest
    }

    #[test]
    fn test_validate_requires_environment() {
        let generator = TerraformGenerator::new(Arc::new(BlueprintRegistry::builtin()));
        let mut incomplete = manifest();
        incomplete.environments.clear();

        let err = generator.validate(&incomplete).unwrap_err();
        assert!(err.to_string().contains("at least one environment"));
    }

    #[test]
    fn test_generate_emits_expected_files() {
        let generator = TerraformGenerator::new(Arc::new(BlueprintRegistry::builtin()));
        let artifacts = generator.generate(&manifest()).unwrap();

        let files: Vec<_> = artifacts.files.keys().cloned().collect();
        assert_eq!(
            files,
            vec![
                "terraform/main.tf",
                "terraform/outputs.tf",
                "terraform/terraform.tfvars.example",
                "terraform/variables.tf",
            ]
        );
    }

    #[test]
    fn test_main_tf_contains_service_and_resource_module() {
        let generator = TerraformGenerator::new(Arc::new(BlueprintRegistry::builtin()));
        let artifacts = generator.generate(&manifest()).unwrap();
        let main_tf = String::from_utf8(artifacts.files["terraform/main.tf"].clone()).unwrap();

        assert!(main_tf.contains("resource \"aws_ecs_service\" \"backend\""));
        assert!(main_tf.contains("container_port   = 8000"));
        assert!(main_tf.contains("module \"backend_maindb\""));
        assert!(main_tf.contains("source = \"modules/aws/rds-postgres\""));
        assert!(main_tf.contains("engine_version = \"16\""));
        assert!(main_tf.contains("databaseName = \"shop\""));
    }

    #[test]
    fn test_region_from_environment() {
        let generator = TerraformGenerator::new(Arc::new(BlueprintRegistry::builtin()));
        let artifacts = generator.generate(&manifest()).unwrap();
        let variables =
            String::from_utf8(artifacts.files["terraform/variables.tf"].clone()).unwrap();
        assert!(variables.contains("default     = \"eu-west-1\""));
    }
}
