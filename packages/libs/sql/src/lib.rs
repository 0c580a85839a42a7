//! tbl-sql: 요청-SQL 조립 파이프라인
//!
//! 구조화된 요청 파라미터를 받아 조각 생성 → 플레이스홀더 번호 조정 →
//! 문장 조립 순서로 하나의 파라미터화된 SQL 문장을 만듭니다. 식별자
//! (database/schema/table/column)는 바인딩할 수 없으므로 검증 후 문자열로
//! 직접 삽입되고, 값은 전부 위치 플레이스홀더로 바인딩됩니다.
//!
//! # 모듈 구조
//!
//! - `params`: 쿼리스트링 기반 요청 파라미터
//! - `fragment`: WHERE/ORDER/GROUP/JOIN/페이지네이션/INSERT/SET 조각 생성기
//! - `placeholder`: 위치 플레이스홀더 번호 조정
//! - `composer`: 연산별 문장 조립
//! - `statements`: 카탈로그 기본 SQL

pub mod composer;
pub mod fragment;
pub mod params;
pub mod placeholder;
pub mod statements;

pub use composer::{ComposedStatement, ResourceTarget};
pub use fragment::Fragment;
pub use params::RequestParams;
pub use placeholder::PlaceholderCursor;
