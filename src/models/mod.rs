pub mod assigned;
pub mod college;
pub mod course;
pub mod department;
pub mod faculty;
pub mod hours;
pub mod room;
pub mod semester;
pub mod setting;

pub use assigned::AssignedCourses;
pub use college::{College, NewCollegeRequest, UpdateCollegeRequest};
pub use course::{AssignFacultyRequest, Course, NewCourseRequest, UpdateCourseRequest};
pub use department::{AssignHodRequest, Department, NewDepartmentRequest, UpdateDepartmentRequest};
pub use faculty::{Faculty, NewFacultyRequest, SetCodeRequest, UpdateFacultyRequest};
pub use hours::WeeklyHours;
pub use room::{NewRoomRequest, Room, UpdateRoomRequest};
pub use semester::{NewSemesterRequest, Semester};
pub use setting::Setting;
