//! tbl-core: Tabula 공통 핵심 라이브러리
//!
//! 이 크레이트는 SQL 조립 라이브러리와 게이트웨이 서비스가 공유하는
//! 핵심 타입과 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `access`: 테이블별 컬럼 접근 정책 (YAML)
//! - `error`: 공통 에러 타입
//! - `ident`: SQL 식별자 검증/인용

pub mod access;
pub mod error;
pub mod ident;

pub use error::{Error, Result};
